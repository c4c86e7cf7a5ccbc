//! Demo: corre una temporada de recompensas (m4) con la configuración del
//! entorno y muestra las emisiones como JSON, una por línea.

use chrono::{TimeZone, Utc};
use spn_engine::reference::rewards::{self, GameRewardInput, RewardSeason, RewardSignal, StakerPosition};
use spn_engine::reference::{init_dotenv, RewardConfig};
use spn_engine::{drive, MemorySink};

fn demo_season() -> RewardSignal {
    RewardSignal { season_id: "season_1".into(),
                   total_reward_pool: 1000.0,
                   games: vec![GameRewardInput { game_id: "g1".into(),
                                                 attention_weight: 60.0,
                                                 stakers: vec![StakerPosition::new("alice", 70.0, 10),
                                                               StakerPosition::new("bob", 30.0, 45)] },
                               GameRewardInput { game_id: "g2".into(),
                                                 attention_weight: 40.0,
                                                 stakers: vec![StakerPosition::new("alice", 20.0, 50),
                                                               StakerPosition::new("carol", 80.0, 5)] }] }
}

fn main() {
    init_dotenv();
    let config = match RewardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuración inválida: {e}");
            std::process::exit(2);
        }
    };

    let Some(timestamp) = Utc.with_ymd_and_hms(2026, 2, 7, 12, 0, 0).single() else {
        eprintln!("timestamp de demo inválido");
        std::process::exit(2);
    };
    let mut season = RewardSeason { config,
                                    seasons: vec![rewards::signal("sig_m4_demo", timestamp, "demo", demo_season())],
                                    sink: MemorySink::new() };

    match drive(&mut season) {
        Ok(report) => {
            for emission in season.sink.emissions() {
                println!("{}", emission.to_value());
            }
            println!("signals={} emissions={} distributed={} fingerprint={}",
                     report.signals,
                     report.emissions,
                     report.state.total_distributed,
                     season.sink.fingerprint());
        }
        Err(e) => {
            eprintln!("la corrida falló: {e}");
            std::process::exit(1);
        }
    }
}
