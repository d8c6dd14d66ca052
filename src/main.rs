//! # SFF Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor HTTP/1.0 con planificación FIFO/SFF.

use sff_server::config::Config;
use sff_server::server::Server;

fn main() {
    println!("=================================");
    println!("  SFF HTTP/1.0 Server");
    println!("  Principios de Sistemas Operativos");
    println!("=================================\n");

    // Parsear configuración desde CLI / env
    let config = Config::new();

    if let Err(e) = config.validate() {
        eprintln!("💥 Configuración inválida: {}", e);
        eprintln!(
            "uso: sff_server [-d root] [-p port] [-t threads] [-b buffers] [-s schedalg] [-w sff_delay_ms]"
        );
        std::process::exit(1);
    }

    config.print_summary();

    // Crear el servidor
    let server = Server::new(config);

    // Iniciar el servidor (esto bloqueará el thread para siempre)
    if let Err(e) = server.run() {
        eprintln!("💥 Error fatal: {}", e);
        std::process::exit(1);
    }
}
