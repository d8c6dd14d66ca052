//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Este módulo implementa la recolección y agregación de métricas del servidor:
//! - Contadores de requests y códigos de estado
//! - Latencias (p50, p95, p99)
//! - Workers ocupados

pub mod collector;

pub use collector::MetricsCollector;
