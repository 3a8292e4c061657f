pub mod amortize;
pub mod analyze;
pub mod market;
pub mod quick;
pub mod scenarios;
pub mod setup;
pub mod ui;
