pub mod fees;
pub mod impermanent_loss;

pub use fees::{annualize_return, per_step_yield};
pub use impermanent_loss::{
    il_risk_cost, impermanent_loss_at_range_limit, impermanent_loss_between,
};
