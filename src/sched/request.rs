//! # Petición Pendiente
//! src/sched/request.rs
//!
//! Define el valor que viaja por la cola del planificador: una conexión
//! aceptada junto con su costo estimado y su número de secuencia de admisión.

/// Costo centinela para recursos dinámicos o inexistentes (stat fallido,
/// rutas cgi). Garantiza que bajo SFF estas peticiones se despachan al final
/// y nunca bloquean a las de costo conocido.
pub const COST_UNKNOWN: u64 = u64::MAX;

/// Una petición admitida, pendiente de despacho.
///
/// Es genérica sobre el handle de conexión `C` para que el planificador sea
/// testeable sin sockets reales; en producción `C = std::net::TcpStream`.
///
/// La propiedad de la conexión se transfiere por movimiento: del aceptador a
/// la cola, y de la cola al worker que la desencola. El worker es el único
/// responsable de cerrarla.
#[derive(Debug)]
pub struct Request<C> {
    /// Handle de la conexión aceptada (propiedad exclusiva)
    conn: C,

    /// Estimación del tamaño de la respuesta en bytes.
    /// `0` bajo FIFO (nunca se calcula); `COST_UNKNOWN` si el recurso es
    /// dinámico o no existe.
    cost_hint: u64,

    /// Contador monótono asignado en la admisión. Estrictamente creciente
    /// durante toda la vida del proceso, sin importar la política activa.
    seq: u64,
}

impl<C> Request<C> {
    /// Crea una petición lista para encolar
    pub fn new(conn: C, cost_hint: u64, seq: u64) -> Self {
        Self { conn, cost_hint, seq }
    }

    /// Costo estimado de la respuesta en bytes
    pub fn cost_hint(&self) -> u64 {
        self.cost_hint
    }

    /// Número de secuencia de admisión
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Consume la petición y entrega la conexión al worker
    pub fn into_conn(self) -> C {
        self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accessors() {
        let req = Request::new(42u32, 1024, 7);
        assert_eq!(req.cost_hint(), 1024);
        assert_eq!(req.seq(), 7);
        assert_eq!(req.into_conn(), 42);
    }

    #[test]
    fn test_cost_unknown_is_max() {
        // El centinela debe ordenar después de cualquier tamaño real de archivo
        assert!(COST_UNKNOWN > 10_000_000_000);
    }
}
