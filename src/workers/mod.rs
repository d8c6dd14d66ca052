//! # Pool de Workers
//! src/workers/mod.rs
//!
//! Un conjunto fijo de threads de larga vida, cada uno en un loop
//! desencolar → atender → cerrar, contra la cola del planificador.
//! La vida del pool es la vida del proceso: no hay señal de apagado.

pub mod pool;

pub use pool::WorkerPool;
