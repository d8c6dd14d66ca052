//! # Planificador de Admisión y Despacho
//! src/sched/mod.rs
//!
//! Este módulo implementa el corazón del servidor:
//! - `policy`: las dos disciplinas de despacho (FIFO y SFF) y su comparador
//! - `request`: la petición pendiente (conexión + costo estimado + secuencia)
//! - `queue`: la cola de prioridad acotada y thread-safe que conecta al
//!   aceptador (productor) con los workers (consumidores)

pub mod policy;
pub mod queue;
pub mod request;

pub use policy::SchedPolicy;
pub use queue::{QueueStats, RequestQueue};
pub use request::{Request, COST_UNKNOWN};
