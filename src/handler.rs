//! # Atención de Conexiones
//! src/handler.rs
//!
//! El núcleo del planificador trata la atención de una petición como una
//! llamada opaca: los workers solo conocen el trait [`Handler`]. La
//! implementación por defecto, [`StaticFileHandler`], sirve archivos
//! estáticos desde el directorio raíz configurado:
//!
//! - `GET /ruta` → contenido del archivo `./ruta`
//! - `GET /ruta/` → `./ruta/index.html`
//! - `GET /metrics` → métricas del servidor y estado de la cola en JSON
//! - rutas `cgi` → 501 (la ejecución de CGI no está soportada)

use crate::http::{Method, Request as HttpRequest, Response, StatusCode};
use crate::metrics::MetricsCollector;
use crate::sched::RequestQueue;
use crate::server::probe;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Instant;

/// Atiende completamente una conexión desencolada.
///
/// El worker es dueño de la conexión: el handler la usa pero no la cierra;
/// el cierre ocurre siempre en el worker, haya o no error aquí.
pub trait Handler: Send + Sync {
    fn handle(&self, stream: &mut TcpStream) -> io::Result<()>;
}

/// Handler por defecto: servidor de archivos estáticos con /metrics
pub struct StaticFileHandler {
    metrics: Arc<MetricsCollector>,
    queue: Arc<RequestQueue<TcpStream>>,
}

impl StaticFileHandler {
    pub fn new(metrics: Arc<MetricsCollector>, queue: Arc<RequestQueue<TcpStream>>) -> Self {
        Self { metrics, queue }
    }

    /// Construye la respuesta para un request ya parseado
    fn respond(&self, request: &HttpRequest) -> Response {
        let path = request.path();

        if path == "/metrics" {
            // Métricas del servidor + estado de la cola del planificador
            let mut body = self.metrics.get_metrics_json();
            body["queue"] = serde_json::to_value(self.queue.stats())
                .unwrap_or(serde_json::Value::Null);
            return Response::json(&body.to_string());
        }

        if path.contains("cgi") {
            return Response::error(
                StatusCode::NotImplemented,
                "CGI execution is not supported",
            );
        }

        // Misma resolución de ruta que usa el sondeo del planificador
        let local_path = probe::resolve_path(path);
        match std::fs::read(&local_path) {
            Ok(contents) => Response::new(StatusCode::Ok)
                .with_header("Content-Type", content_type_for(&local_path))
                .with_body_bytes(contents),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                Response::error(StatusCode::Forbidden, "could not read file")
            }
            Err(_) => Response::error(StatusCode::NotFound, "could not find file"),
        }
    }
}

impl Handler for StaticFileHandler {
    fn handle(&self, stream: &mut TcpStream) -> io::Result<()> {
        let start = Instant::now();

        let mut buffer = [0u8; 8192];
        let bytes_read = stream.read(&mut buffer)?;

        if bytes_read == 0 {
            // El peer cerró sin enviar nada: no hay nada que responder
            return Ok(());
        }

        let (response, path, method) = match HttpRequest::parse(&buffer[..bytes_read]) {
            Ok(request) => {
                let path = request.path().to_string();
                let method = request.method();
                (self.respond(&request), path, method)
            }
            Err(e) => (
                Response::error(StatusCode::BadRequest, &format!("Invalid: {}", e)),
                "/error".to_string(),
                Method::GET,
            ),
        };

        // HEAD recibe los mismos headers (incluido Content-Length) sin body
        let bytes = match method {
            Method::HEAD => response.header_bytes(),
            Method::GET => response.to_bytes(),
        };
        stream.write_all(&bytes)?;
        stream.flush()?;

        self.metrics
            .record_request(&path, response.status().as_u16(), start.elapsed());

        Ok(())
    }
}

/// Content-Type según la extensión del archivo
fn content_type_for(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("");
    match ext {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::SchedPolicy;
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::Duration;

    fn test_handler() -> StaticFileHandler {
        let queue = Arc::new(RequestQueue::new(4, SchedPolicy::Fifo, Duration::ZERO));
        StaticFileHandler::new(Arc::new(MetricsCollector::new()), queue)
    }

    /// Helper: atiende un request crudo por loopback y retorna la respuesta
    fn roundtrip(raw: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().unwrap();

        let t = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            test_handler().handle(&mut stream).unwrap();
        });

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(raw).unwrap();
        client.shutdown(std::net::Shutdown::Write).unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        t.join().unwrap();

        String::from_utf8_lossy(&buf).to_string()
    }

    #[test]
    fn test_missing_file_is_404() {
        let text = roundtrip(b"GET /no-existe-para-nada.html HTTP/1.0\r\n\r\n");
        assert!(text.contains("404 Not Found"));
    }

    #[test]
    fn test_cgi_path_is_501() {
        let text = roundtrip(b"GET /cgi-bin/app?x=1 HTTP/1.0\r\n\r\n");
        assert!(text.contains("501 Not Implemented"));
    }

    #[test]
    fn test_parse_error_is_400() {
        let text = roundtrip(b"\x00\x01\x02garbage");
        assert!(text.contains("400 Bad Request"));
        assert!(text.contains("Invalid:"));
    }

    #[test]
    fn test_metrics_endpoint() {
        let text = roundtrip(b"GET /metrics HTTP/1.0\r\n\r\n");
        assert!(text.contains("200 OK"));
        assert!(text.contains("\"total_requests\""));
        assert!(text.contains("\"queue\""));
        assert!(text.contains("\"capacity\""));
    }

    #[test]
    fn test_head_omits_body() {
        let text = roundtrip(b"HEAD /no-existe-para-nada.html HTTP/1.0\r\n\r\n");
        assert!(text.contains("404 Not Found"));
        assert!(text.contains("Content-Length:"));
        // Sin body: termina en la línea vacía de los headers
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_content_type_for_extensions() {
        assert_eq!(content_type_for("./index.html"), "text/html");
        assert_eq!(content_type_for("./style.css"), "text/css");
        assert_eq!(content_type_for("./foto.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("./binario"), "application/octet-stream");
    }
}
