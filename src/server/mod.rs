//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Este módulo implementa el frente del servidor:
//! 1. `tcp`: el loop de aceptación (un solo thread) que admite conexiones
//!    en la cola del planificador
//! 2. `probe`: el sondeo no destructivo que estima el costo de una petición
//!    mirando el tamaño del archivo pedido (solo bajo SFF)

pub mod probe;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use tcp::Server;
