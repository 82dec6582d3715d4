//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements    | Connects to                |
//! |-----------------|---------------|----------------------------|
//! | `env_config`    | ConfigPort    | `PUMP_*` environment vars  |
//! | `log_sink`      | EventSink     | `log` facade               |
//! | `rng`           | RandomSource  | ChaCha8 PRNG               |
//! | `tcp_transport` | Transport     | Non-blocking TCP listener  |
//! | `time`          | TimePort      | `std::time::Instant`       |

pub mod env_config;
pub mod log_sink;
pub mod rng;
pub mod tcp_transport;
pub mod time;
