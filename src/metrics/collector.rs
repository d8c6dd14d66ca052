//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Recolecta y agrega métricas del servidor en tiempo real.

use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

/// Datos internos de métricas
struct MetricsData {
    /// Contador total de requests atendidos
    total_requests: u64,

    /// Requests por código de estado
    status_codes: HashMap<u16, u64>,

    /// Latencias registradas (en microsegundos)
    latencies: Vec<u64>,

    /// Máximo de latencias a guardar (para calcular percentiles)
    max_latencies: usize,

    /// Requests por ruta
    requests_per_path: HashMap<String, u64>,

    /// Workers despachando una petición ahora mismo
    busy_workers: u64,
}

impl MetricsCollector {
    /// Crea un nuevo collector de métricas
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData {
                total_requests: 0,
                status_codes: HashMap::new(),
                latencies: Vec::with_capacity(10000),
                max_latencies: 10000, // Guardar últimas 10k latencias
                requests_per_path: HashMap::new(),
                busy_workers: 0,
            })),
            start_time: Instant::now(),
        }
    }

    /// Registra un request atendido
    pub fn record_request(&self, path: &str, status_code: u16, latency: Duration) {
        let mut data = self.inner.lock().unwrap();

        data.total_requests += 1;
        *data.status_codes.entry(status_code).or_insert(0) += 1;

        // Registrar latencia (en microsegundos)
        let latency_us = latency.as_micros() as u64;
        if data.latencies.len() >= data.max_latencies {
            data.latencies.remove(0);
        }
        data.latencies.push(latency_us);

        *data.requests_per_path.entry(path.to_string()).or_insert(0) += 1;
    }

    /// Marca un worker como ocupado (acaba de desencolar)
    pub fn worker_busy(&self) {
        let mut data = self.inner.lock().unwrap();
        data.busy_workers += 1;
    }

    /// Marca un worker como libre (cerró la conexión)
    pub fn worker_idle(&self) {
        let mut data = self.inner.lock().unwrap();
        if data.busy_workers > 0 {
            data.busy_workers -= 1;
        }
    }

    /// Obtiene el número de workers ocupados
    pub fn busy_workers(&self) -> u64 {
        let data = self.inner.lock().unwrap();
        data.busy_workers
    }

    /// Total de requests atendidos
    pub fn total_requests(&self) -> u64 {
        let data = self.inner.lock().unwrap();
        data.total_requests
    }

    /// Obtiene las métricas actuales como JSON
    pub fn get_metrics_json(&self) -> serde_json::Value {
        let data = self.inner.lock().unwrap();

        let uptime_secs = self.start_time.elapsed().as_secs();
        let (p50, p95, p99, avg) = Self::calculate_percentiles(&data.latencies);

        let status_codes: HashMap<String, u64> = data
            .status_codes
            .iter()
            .map(|(code, count)| (code.to_string(), *count))
            .collect();

        // Top 10 rutas más accedidas
        let mut paths: Vec<_> = data.requests_per_path.iter().collect();
        paths.sort_by(|a, b| b.1.cmp(a.1));
        let top_paths: Vec<serde_json::Value> = paths
            .iter()
            .take(10)
            .map(|(path, count)| json!({"path": path, "count": count}))
            .collect();

        json!({
            "uptime_secs": uptime_secs,
            "total_requests": data.total_requests,
            "busy_workers": data.busy_workers,
            "status_codes": status_codes,
            "latency_us": {
                "avg": avg,
                "p50": p50,
                "p95": p95,
                "p99": p99,
            },
            "top_paths": top_paths,
        })
    }

    /// Calcula percentiles de latencia (p50, p95, p99) y promedio
    fn calculate_percentiles(latencies: &[u64]) -> (u64, u64, u64, u64) {
        if latencies.is_empty() {
            return (0, 0, 0, 0);
        }

        let mut sorted = latencies.to_vec();
        sorted.sort_unstable();

        let percentile = |p: f64| -> u64 {
            let idx = ((sorted.len() as f64) * p).ceil() as usize;
            sorted[idx.saturating_sub(1).min(sorted.len() - 1)]
        };

        let avg = sorted.iter().sum::<u64>() / sorted.len() as u64;

        (percentile(0.50), percentile(0.95), percentile(0.99), avg)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_request() {
        let metrics = MetricsCollector::new();

        metrics.record_request("/index.html", 200, Duration::from_millis(5));
        metrics.record_request("/missing.html", 404, Duration::from_millis(1));
        metrics.record_request("/index.html", 200, Duration::from_millis(3));

        assert_eq!(metrics.total_requests(), 3);

        let json = metrics.get_metrics_json();
        assert_eq!(json["total_requests"], 3);
        assert_eq!(json["status_codes"]["200"], 2);
        assert_eq!(json["status_codes"]["404"], 1);
    }

    #[test]
    fn test_busy_workers_counter() {
        let metrics = MetricsCollector::new();
        assert_eq!(metrics.busy_workers(), 0);

        metrics.worker_busy();
        metrics.worker_busy();
        assert_eq!(metrics.busy_workers(), 2);

        metrics.worker_idle();
        assert_eq!(metrics.busy_workers(), 1);

        // Nunca baja de cero
        metrics.worker_idle();
        metrics.worker_idle();
        assert_eq!(metrics.busy_workers(), 0);
    }

    #[test]
    fn test_latency_percentiles() {
        let metrics = MetricsCollector::new();
        for ms in 1..=100 {
            metrics.record_request("/f", 200, Duration::from_micros(ms * 10));
        }

        let json = metrics.get_metrics_json();
        let p50 = json["latency_us"]["p50"].as_u64().unwrap();
        let p99 = json["latency_us"]["p99"].as_u64().unwrap();
        assert!(p50 <= p99);
        assert!(p99 <= 1000);
    }

    #[test]
    fn test_empty_metrics_json() {
        let metrics = MetricsCollector::new();
        let json = metrics.get_metrics_json();

        assert_eq!(json["total_requests"], 0);
        assert_eq!(json["latency_us"]["p50"], 0);
    }

    #[test]
    fn test_top_paths() {
        let metrics = MetricsCollector::new();
        metrics.record_request("/a", 200, Duration::from_millis(1));
        metrics.record_request("/a", 200, Duration::from_millis(1));
        metrics.record_request("/b", 200, Duration::from_millis(1));

        let json = metrics.get_metrics_json();
        let top = json["top_paths"].as_array().unwrap();
        assert_eq!(top[0]["path"], "/a");
        assert_eq!(top[0]["count"], 2);
    }
}
