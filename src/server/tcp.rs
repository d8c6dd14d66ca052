//! # Loop de Aceptación
//! src/server/tcp.rs
//!
//! Un único thread acepta conexiones de a una, las sondea (solo bajo SFF) y
//! las admite en la cola del planificador, bloqueando si está llena
//! (backpressure). La aceptación serializada es deliberada: acota la
//! velocidad a la que entra trabajo nuevo al sistema.

use crate::config::Config;
use crate::handler::{Handler, StaticFileHandler};
use crate::metrics::MetricsCollector;
use crate::sched::{Request, RequestQueue, SchedPolicy};
use crate::server::probe;
use std::io;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

/// Servidor HTTP/1.0 con planificador de despachos FIFO/SFF.
///
/// Instancia única por proceso, construida al arranque; la cola, las métricas
/// y el handler se comparten por `Arc` con el pool de workers. Nada de estado
/// a nivel de proceso: todo vive en este objeto.
pub struct Server {
    config: Config,
    queue: Arc<RequestQueue<TcpStream>>,
    metrics: Arc<MetricsCollector>,
    handler: Arc<dyn Handler>,
}

impl Server {
    /// Construye el servidor con el handler de archivos estáticos por defecto
    pub fn new(config: Config) -> Self {
        let policy = SchedPolicy::from_str(&config.schedalg);
        let queue = Arc::new(RequestQueue::new(
            config.buffers,
            policy,
            Duration::from_millis(config.sff_delay_ms),
        ));
        let metrics = Arc::new(MetricsCollector::new());
        let handler: Arc<dyn Handler> = Arc::new(StaticFileHandler::new(
            Arc::clone(&metrics),
            Arc::clone(&queue),
        ));

        Self {
            config,
            queue,
            metrics,
            handler,
        }
    }

    /// Arranca el servidor: chdir a la raíz, lanza el pool de workers y entra
    /// al loop de aceptación. No retorna durante la operación normal.
    ///
    /// Errores fatales (chdir o bind fallidos) se propagan para que main
    /// termine el proceso con código != 0.
    pub fn run(&self) -> io::Result<()> {
        // Cambiar a la raíz de servicio: todas las rutas se resuelven
        // relativas a este directorio. Fallar aquí es fatal.
        std::env::set_current_dir(&self.config.root_dir)?;

        crate::workers::WorkerPool::spawn(
            self.config.threads,
            Arc::clone(&self.queue),
            Arc::clone(&self.handler),
            Arc::clone(&self.metrics),
        );

        let address = self.config.address();
        let listener = TcpListener::bind(&address)?;
        println!(
            "[+] Servidor escuchando en {} (politica: {})",
            address,
            self.queue.policy().as_str()
        );

        self.accept_loop(listener)
    }

    /// Loop de aceptación: corre para siempre
    fn accept_loop(&self, listener: TcpListener) -> io::Result<()> {
        // Contador de admisión: estrictamente creciente durante toda la vida
        // del proceso, sin importar la política. Solo lo toca este thread.
        let mut seq: u64 = 0;

        for stream in listener.incoming() {
            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("   ❌ Error al aceptar conexión: {}", e);
                    continue;
                }
            };

            // Bajo FIFO el costo nunca se calcula: queda en 0
            let cost_hint = match self.queue.policy() {
                SchedPolicy::Fifo => 0,
                SchedPolicy::Sff => match probe::estimate_cost(&stream) {
                    Ok(cost) => cost,
                    Err(e) => {
                        // Recuperable: descartar la conexión en silencio y
                        // seguir con la siguiente (sin respuesta, sin encolar)
                        eprintln!("   ❌ Sondeo fallido, conexión descartada: {}", e);
                        drop(stream);
                        continue;
                    }
                },
            };

            let request = Request::new(stream, cost_hint, seq);
            seq += 1;

            // Bloquea mientras la cola esté llena (backpressure)
            self.queue.enqueue(request);
        }

        Ok(())
    }

    /// Acceso a la cola del planificador (para observabilidad y tests)
    pub fn queue(&self) -> &Arc<RequestQueue<TcpStream>> {
        &self.queue
    }

    /// Acceso al collector de métricas
    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }
}
