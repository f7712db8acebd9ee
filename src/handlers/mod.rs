// handlers/mod.rs
//
// public  - service info, liveness ping, 404 fallback
// health  - schema health report and plain status
pub mod health;
pub mod public;
