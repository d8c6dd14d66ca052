//! # Loop de los Workers
//! src/workers/pool.rs
//!
//! Cada worker repite para siempre: `dequeue_min()` sobre la cola del
//! planificador, atender la conexión con el handler, y cerrarla. El worker
//! cierra la conexión siempre, falle o no el handler, y nunca re-encola una
//! petición.

use crate::handler::Handler;
use crate::metrics::MetricsCollector;
use crate::sched::RequestQueue;
use std::net::{Shutdown, TcpStream};
use std::process;
use std::sync::Arc;
use std::thread;

/// Pool fijo de workers desacoplados (detach-and-forget)
pub struct WorkerPool;

impl WorkerPool {
    /// Lanza `count` workers contra la cola.
    ///
    /// Los JoinHandle se descartan: los workers viven tanto como el proceso.
    /// Si algún thread no puede crearse, el arranque es fatal.
    pub fn spawn(
        count: usize,
        queue: Arc<RequestQueue<TcpStream>>,
        handler: Arc<dyn Handler>,
        metrics: Arc<MetricsCollector>,
    ) {
        for i in 0..count {
            let queue = Arc::clone(&queue);
            let handler = Arc::clone(&handler);
            let metrics = Arc::clone(&metrics);

            let spawned = thread::Builder::new()
                .name(format!("worker-{}", i))
                .spawn(move || Self::worker_loop(i, queue, handler, metrics));

            if let Err(e) = spawned {
                eprintln!("💥 No se pudo crear el worker {}: {}", i, e);
                process::exit(1);
            }
        }
    }

    /// Loop principal del worker
    fn worker_loop(
        id: usize,
        queue: Arc<RequestQueue<TcpStream>>,
        handler: Arc<dyn Handler>,
        metrics: Arc<MetricsCollector>,
    ) {
        println!("🔧 Worker {} started", id);

        loop {
            let request = queue.dequeue_min();
            let seq = request.seq();
            metrics.worker_busy();

            // A partir de aquí la conexión es propiedad exclusiva de este worker
            let mut conn = request.into_conn();
            if let Err(e) = handler.handle(&mut conn) {
                eprintln!("   ❌ Worker {} error atendiendo req #{}: {}", id, seq, e);
            }

            // Cerrar siempre, haya fallado o no el handler
            let _ = conn.shutdown(Shutdown::Both);
            drop(conn);

            metrics.worker_idle();
        }
    }
}
