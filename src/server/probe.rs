//! # Sondeo de Tamaño (SizeProbe)
//! src/server/probe.rs
//!
//! Bajo SFF, el aceptador necesita conocer el costo estimado de una petición
//! *antes* de encolarla, sin consumir los bytes que el handler leerá después.
//!
//! El sondeo hace un `peek` sobre la conexión aceptada (los datos quedan
//! disponibles para la lectura real), extrae la request line, la resuelve a
//! una ruta local y consulta el tamaño del archivo con `stat`:
//!
//! - archivo existente → costo = tamaño en bytes
//! - recurso dinámico (cgi) o stat fallido → [`COST_UNKNOWN`], que ordena al
//!   final bajo SFF
//!
//! Si el peek no entrega datos o la request line no parsea, el sondeo falla:
//! el aceptador debe cerrar la conexión y descartar la petición sin respuesta.

use crate::sched::request::COST_UNKNOWN;
use std::fs;
use std::io;
use std::net::TcpStream;

/// Tamaño máximo del buffer de peek (igual al buffer de lectura del handler)
pub const PEEK_BUF_SIZE: usize = 8192;

/// Errores del sondeo. Todos son recuperables por-petición: la conexión se
/// cierra y se descarta en silencio, el aceptador continúa con la siguiente.
#[derive(Debug)]
pub enum ProbeError {
    /// El peek no entregó ningún byte (el peer cerró sin enviar datos)
    EmptyPeek,

    /// La request line no tiene el formato `<método> <uri> <versión>`
    InvalidRequestLine,

    /// Error de IO durante el peek
    Io(io::Error),
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeError::EmptyPeek => write!(f, "peek returned no data"),
            ProbeError::InvalidRequestLine => write!(f, "invalid request line"),
            ProbeError::Io(e) => write!(f, "peek failed: {}", e),
        }
    }
}

impl std::error::Error for ProbeError {}

impl From<io::Error> for ProbeError {
    fn from(e: io::Error) -> Self {
        ProbeError::Io(e)
    }
}

/// Estima el costo de la petición que espera en `stream`.
///
/// Lectura no destructiva: usa `TcpStream::peek`, así el handler vuelve a
/// ver los mismos bytes al atender la conexión.
pub fn estimate_cost(stream: &TcpStream) -> Result<u64, ProbeError> {
    let mut buf = [0u8; PEEK_BUF_SIZE];
    let n = stream.peek(&mut buf)?;
    if n == 0 {
        return Err(ProbeError::EmptyPeek);
    }

    // Primera línea: hasta '\n' o hasta el límite del buffer
    let line_end = buf[..n]
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(n);
    let line = String::from_utf8_lossy(&buf[..line_end]);

    let (_method, uri, _version) = parse_request_line(&line).ok_or(ProbeError::InvalidRequestLine)?;

    let path = resolve_path(&uri);
    Ok(stat_cost(&path))
}

/// Parsea una request line `<método> <uri> <versión>`.
///
/// Retorna `None` si no hay al menos tres tokens separados por espacios.
pub fn parse_request_line(line: &str) -> Option<(String, String, String)> {
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let uri = parts.next()?.to_string();
    let version = parts.next()?.to_string();
    Some((method, uri, version))
}

/// Resuelve una URI a una ruta local relativa a la raíz de servicio.
///
/// - URI estática: `.<uri>`; si termina en `/` se le agrega `index.html`.
/// - URI dinámica (contiene el marcador `cgi`): se descarta el query string
///   (todo lo que sigue a `?`) antes de mapear a `.<uri>`.
pub fn resolve_path(uri: &str) -> String {
    if !uri.contains("cgi") {
        let mut path = format!(".{}", uri);
        if uri.ends_with('/') {
            path.push_str("index.html");
        }
        path
    } else {
        let base = uri.split('?').next().unwrap_or(uri);
        format!(".{}", base)
    }
}

/// Consulta el tamaño del recurso resuelto.
///
/// Un stat fallido (archivo inexistente, ruta cgi sin script local, permisos)
/// produce el centinela [`COST_UNKNOWN`]: la petición se planifica al final
/// bajo SFF en lugar de bloquear a las de costo conocido.
pub fn stat_cost(path: &str) -> u64 {
    match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(_) => COST_UNKNOWN,
    }
}
