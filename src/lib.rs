//! # SFF Server
//! src/lib.rs
//!
//! Servidor HTTP/1.0 concurrente implementado desde cero para demostrar
//! conceptos de sistemas operativos: concurrencia, sincronización y
//! planificación de despachos.
//!
//! La pieza central es el planificador de admisión y despacho: las conexiones
//! aceptadas se almacenan en una cola acotada y un pool fijo de workers las
//! atiende según una de dos disciplinas:
//!
//! - **FIFO**: estrictamente en orden de llegada.
//! - **SFF** (Smallest-File-First): primero la petición cuya respuesta
//!   estimada sea más pequeña (tamaño del archivo pedido).
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `sched`: cola de prioridad acotada y políticas de planificación
//! - `server`: loop de aceptación de conexiones y sondeo de tamaño (probe)
//! - `workers`: pool fijo de threads que despachan peticiones
//! - `handler`: atención de una conexión (archivos estáticos)
//! - `http`: parsing y construcción de mensajes HTTP/1.0
//! - `config`: configuración por CLI y variables de entorno
//! - `metrics`: recolección de métricas y observabilidad
//!
//! ## Ejemplo de uso
//!
//! ```ignore
//! use sff_server::server::Server;
//! use sff_server::config::Config;
//!
//! let config = Config::default();
//! let server = Server::new(config);
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod config;
pub mod handler;
pub mod http;
pub mod metrics;
pub mod sched;
pub mod server;
pub mod workers;
