// 1. Traits
pub use crate::agent::Agent;
pub use crate::gym::Env;

// 2. The Core "Loop" Types
pub use crate::gym::forex::{
    action::{Decision, Decisions},
    config::EnvConfig,
    diagnostics::{Diagnostics, SymbolDiagnostics},
    env::{EpisodeSummary, ForexEnv},
    observation::{Observation, ObservationWindow},
    space::{ActionSpace, ObservationSpace},
};
pub use crate::gym::{EnvStatus, Reward, StepOutcome};

// 3. Trading Domain Types
pub use crate::data::calendar::{HourBand, Weekday};
pub use crate::data::domain::{Lots, Money, PipCost, Pips, Price, SymbolId, TickIndex};
pub use crate::gym::forex::spread::{LiquidityWindow, SpreadConfig};
pub use crate::gym::forex::types::{CloseCause, Direction, TradeType};

// 4. Data
pub use crate::data::table::{SymbolData, TickTable};

// 5. Agents
pub use crate::agent::AgentIdentifier;
pub use crate::agent::baseline::{IdleAgent, RandomAgent};
pub use crate::agent::momentum::MomentumAgent;

// 6. Errors
pub use crate::error::{
    AgentError, DataError, EnvError, GymError, GymResult, IoError, SystemError,
};
