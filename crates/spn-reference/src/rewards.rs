//! m4: attention -> pool -> staker. Reparto determinista de recompensas de
//! temporada con registro `trace` en cada emisión.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use spn_core::{named, EmissionSink, Emission, GameProtocol, IterSource, Pipeline, Signal, Step, StepOutput, StepResult};

use crate::config::RewardConfig;
use crate::numeric::{proportional_split, round_to, shares};

pub const PIPELINE_NAME: &str = "m4_attention_pool_staker";

pub type ByGame<T> = BTreeMap<String, T>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakerPosition {
    pub staker_id: String,
    pub stake_weight: f64,
    #[serde(default)]
    pub conviction_days: u32,
}

impl StakerPosition {
    pub fn new(staker_id: impl Into<String>, stake_weight: f64, conviction_days: u32) -> Self {
        Self { staker_id: staker_id.into(),
               stake_weight,
               conviction_days }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRewardInput {
    pub game_id: String,
    pub attention_weight: f64,
    pub stakers: Vec<StakerPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardSignal {
    pub season_id: String,
    pub total_reward_pool: f64,
    pub games: Vec<GameRewardInput>,
}

impl RewardSignal {
    fn games_sorted(&self) -> Vec<&GameRewardInput> {
        let mut games: Vec<&GameRewardInput> = self.games.iter().collect();
        games.sort_by(|a, b| a.game_id.cmp(&b.game_id));
        games
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardState {
    pub seasons_processed: u64,
    pub latest_season_id: String,
    pub latest_attention_share_by_game: ByGame<f64>,
    pub latest_game_pool_by_game: ByGame<f64>,
    pub latest_staker_rewards_by_game: ByGame<BTreeMap<String, f64>>,
    pub total_distributed: f64,
}

fn attention(signal: &Signal<RewardSignal>, _state: &RewardState) -> StepResult<RewardSignal, RewardState> {
    let season = signal.payload();
    let weights: Vec<(String, f64)> = season.games_sorted()
                                            .into_iter()
                                            .map(|g| (g.game_id.clone(), g.attention_weight))
                                            .collect();
    let total_attention: f64 = weights.iter().map(|(_, w)| w.max(0.0)).sum();
    let share_by_game = shares(&weights);

    let emission = Emission::derived(signal,
                                     "attention",
                                     "m4.rewards.attention.computed",
                                     json!({
                                         "season_id": season.season_id,
                                         "attention_share_by_game": share_by_game,
                                         "total_attention": round_to(total_attention, 6),
                                     }))
                   .with_trace("attention_share", "game_attention / sum(game_attention)");
    let season_id = season.season_id.clone();
    Ok(StepOutput::one(emission).updating(move |s: &RewardState| RewardState { latest_season_id: season_id,
                                                                              latest_attention_share_by_game:
                                                                                  share_by_game,
                                                                              ..s.clone() }))
}

fn pool(signal: &Signal<RewardSignal>, state: &RewardState) -> StepResult<RewardSignal, RewardState> {
    let season = signal.payload();
    let pool_by_game: ByGame<f64> =
        state.latest_attention_share_by_game
             .iter()
             .map(|(game_id, share)| (game_id.clone(), round_to(season.total_reward_pool * share, 6)))
             .collect();

    let emission = Emission::derived(signal,
                                     "pool",
                                     "m4.rewards.pool.allocated",
                                     json!({
                                         "season_id": season.season_id,
                                         "total_reward_pool": round_to(season.total_reward_pool, 6),
                                         "reward_pool_by_game": pool_by_game,
                                     }))
                   .with_trace("game_reward_pool_allocation", "total_reward_pool * attention_share");
    Ok(StepOutput::one(emission).updating(move |s: &RewardState| RewardState { latest_game_pool_by_game: pool_by_game,
                                                                              ..s.clone() }))
}

/// Reparto del pool de cada juego entre sus stakers, con el multiplicador
/// de convicción temprana opcional.
pub struct StakerAllocation {
    config: RewardConfig,
}

impl StakerAllocation {
    pub fn new(config: RewardConfig) -> Self {
        Self { config }
    }

    fn multiplier(&self, staker: &StakerPosition) -> f64 {
        if self.config.enable_early_conviction_multiplier
           && staker.conviction_days >= self.config.early_conviction_days_threshold
        {
            self.config.early_conviction_multiplier
        } else {
            1.0
        }
    }

    fn allocate(&self, game: &GameRewardInput, game_pool: f64) -> BTreeMap<String, f64> {
        let mut stakers: Vec<&StakerPosition> = game.stakers.iter().collect();
        stakers.sort_by(|a, b| a.staker_id.cmp(&b.staker_id));
        let effective: Vec<(String, f64)> = stakers.into_iter()
                                                   .map(|s| (s.staker_id.clone(), s.stake_weight.max(0.0) * self.multiplier(s)))
                                                   .collect();
        proportional_split(game_pool, &effective)
    }
}

impl Step<RewardSignal, RewardState> for StakerAllocation {
    fn id(&self) -> &str {
        "staker"
    }

    fn run(&self, signal: &Signal<RewardSignal>, state: &RewardState) -> StepResult<RewardSignal, RewardState> {
        let season = signal.payload();
        let reward_by_game: ByGame<BTreeMap<String, f64>> =
            season.games_sorted()
                  .into_iter()
                  .map(|game| {
                      let game_pool = state.latest_game_pool_by_game.get(&game.game_id).copied().unwrap_or(0.0);
                      (game.game_id.clone(), self.allocate(game, game_pool))
                  })
                  .collect();
        let distributed = round_to(reward_by_game.values().flat_map(|alloc| alloc.values()).sum(), 6);

        let emission = Emission::derived(signal,
                                         "staker",
                                         "m4.rewards.staker.allocated",
                                         json!({
                                             "season_id": season.season_id,
                                             "staker_reward_by_game": reward_by_game,
                                             "total_distributed": distributed,
                                             "config": self.config,
                                         }))
                       .with_trace("staker_share_allocation",
                                   "game_pool * (effective_stake / sum(effective_stake))");
        let update = move |s: &RewardState| RewardState { seasons_processed: s.seasons_processed + 1,
                                                          latest_staker_rewards_by_game: reward_by_game,
                                                          total_distributed: s.total_distributed + distributed,
                                                          ..s.clone() };
        Ok(StepOutput::one(emission).updating(update))
    }
}

pub fn pipeline(config: RewardConfig) -> Pipeline<RewardSignal, RewardState> {
    Pipeline::builder(PIPELINE_NAME).step(named("attention", attention))
                                    .step(named("pool", pool))
                                    .step(StakerAllocation::new(config))
                                    .build()
}

pub fn signal(signal_id: impl Into<String>,
              timestamp: DateTime<Utc>,
              source: impl Into<String>,
              season: RewardSignal)
              -> Signal<RewardSignal> {
    Signal::new(signal_id, timestamp, source, season)
}

/// Protocolo de una corrida de temporadas: pipeline m4 con `config`, las
/// señales de `seasons` en orden y el sink elegido por el llamador.
pub struct RewardSeason<K> {
    pub config: RewardConfig,
    pub seasons: Vec<Signal<RewardSignal>>,
    pub sink: K,
}

impl<K: EmissionSink> GameProtocol for RewardSeason<K> {
    type Payload = RewardSignal;
    type State = RewardState;
    type Source = IterSource<std::vec::IntoIter<Signal<RewardSignal>>>;
    type Sink = K;

    fn pipeline(&self) -> Arc<Pipeline<RewardSignal, RewardState>> {
        Arc::new(pipeline(self.config.clone()))
    }

    fn initial_state(&self) -> RewardState {
        RewardState::default()
    }

    /// Entrega las temporadas pendientes; una segunda llamada no repite las
    /// ya entregadas.
    fn source(&mut self) -> Self::Source {
        IterSource::new(std::mem::take(&mut self.seasons))
    }

    fn sink(&mut self) -> &mut K {
        &mut self.sink
    }
}
