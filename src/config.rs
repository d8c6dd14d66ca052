//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor con soporte completo
//! para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./sff_server -d ./www -p 10000 -t 4 -b 16 -s SFF -w 200
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! SERVER_PORT=10000 SERVER_SCHEDALG=SFF ./sff_server
//! ```

use clap::Parser;

/// Configuración del servidor HTTP/1.0 con planificador FIFO/SFF
#[derive(Debug, Clone, Parser)]
#[command(name = "sff_server")]
#[command(about = "Servidor HTTP/1.0 concurrente con planificación FIFO/SFF")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Directorio raíz desde el que se sirven los archivos
    #[arg(short = 'd', long = "root-dir", default_value = ".", env = "SERVER_ROOT")]
    pub root_dir: String,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "SERVER_HOST")]
    pub host: String,

    /// Puerto en el que escucha el servidor (debe estar en [1024, 65535])
    #[arg(short = 'p', long, default_value = "10000", env = "SERVER_PORT")]
    pub port: u16,

    /// Número de threads worker del pool
    #[arg(short = 't', long, default_value = "1", env = "SERVER_THREADS")]
    pub threads: usize,

    /// Capacidad de la cola de peticiones pendientes (buffers)
    #[arg(short = 'b', long, default_value = "1", env = "SERVER_BUFFERS")]
    pub buffers: usize,

    /// Algoritmo de planificación: "FIFO" o "SFF" (case-insensitive;
    /// cualquier otro valor cae a FIFO)
    #[arg(short = 's', long, default_value = "FIFO", env = "SERVER_SCHEDALG")]
    pub schedalg: String,

    /// Ventana de espera del despacho SFF en milisegundos (0 la desactiva)
    #[arg(short = 'w', long = "sff-delay-ms", default_value = "200", env = "SERVER_SFF_DELAY_MS")]
    pub sff_delay_ms: u64,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use sff_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:10000");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos. Un puerto fuera de
    /// [1024, 65535] es fatal: main imprime el uso y termina con código != 0.
    pub fn validate(&self) -> Result<(), String> {
        if self.port < 1024 {
            return Err(format!(
                "Invalid port number: {}. Port must be between 1024 and 65535",
                self.port
            ));
        }

        if self.threads == 0 {
            return Err("Worker threads must be >= 1".to_string());
        }

        if self.buffers == 0 {
            return Err("Queue capacity (buffers) must be >= 1".to_string());
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════╗");
        println!("║        SFF Server - Configuración                ║");
        println!("╚══════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Red:");
        println!("   Dirección:    {}", self.address());
        println!("   Raíz:         {}", self.root_dir);
        println!();
        println!("📋 Planificación:");
        println!("   Algoritmo:    {}", self.schedalg);
        println!("   Workers:      {}", self.threads);
        println!("   Buffers:      {}", self.buffers);
        println!("   SFF delay:    {} ms", self.sff_delay_ms);
        println!();
        println!("════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto (mismos valores que los defaults del CLI)
    fn default() -> Self {
        Self {
            root_dir: ".".to_string(),
            host: "0.0.0.0".to_string(),
            port: 10000,
            threads: 1,
            buffers: 1,
            schedalg: "FIFO".to_string(),
            sff_delay_ms: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 10000);
        assert_eq!(config.root_dir, ".");
        assert_eq!(config.threads, 1);
        assert_eq!(config.buffers, 1);
        assert_eq!(config.schedalg, "FIFO");
        assert_eq!(config.sff_delay_ms, 200);
    }

    #[test]
    fn test_address() {
        let config = Config::default();
        assert_eq!(config.address(), "0.0.0.0:10000");
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_validate_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    // ==================== Port Validation ====================

    #[test]
    fn test_validate_port_too_low() {
        let mut config = Config::default();
        config.port = 80;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid port number"));
    }

    #[test]
    fn test_validate_port_min_value() {
        let mut config = Config::default();
        config.port = 1024;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_port_max_value() {
        let mut config = Config::default();
        config.port = 65535;
        assert!(config.validate().is_ok());
    }

    // ==================== Workers / Buffers Validation ====================

    #[test]
    fn test_validate_invalid_threads() {
        let mut config = Config::default();
        config.threads = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Worker threads"));
    }

    #[test]
    fn test_validate_invalid_buffers() {
        let mut config = Config::default();
        config.buffers = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Queue capacity"));
    }

    // ==================== Custom Values ====================

    #[test]
    fn test_config_custom_values() {
        let mut config = Config::default();
        config.port = 9000;
        config.threads = 8;
        config.buffers = 32;
        config.schedalg = "SFF".to_string();
        config.sff_delay_ms = 50;

        assert_eq!(config.port, 9000);
        assert_eq!(config.threads, 8);
        assert_eq!(config.buffers, 32);
        assert_eq!(config.schedalg, "SFF");
        assert_eq!(config.sff_delay_ms, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_print_summary() {
        let config = Config::default();
        // Should not panic
        config.print_summary();
    }
}
