pub mod dispatch;
pub mod sampler;
pub mod screening;
pub mod simulator;
pub mod tour;
pub mod truck;
