//! # Políticas de Planificación
//! src/sched/policy.rs
//!
//! Define las dos disciplinas de despacho y el comparador que es la única
//! fuente de verdad del orden de la cola.

use crate::sched::request::Request;
use serde::Serialize;
use std::cmp::Ordering;

/// Disciplina de despacho, fijada una vez al arranque del proceso
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchedPolicy {
    /// Despachar estrictamente en orden de llegada
    Fifo,

    /// Smallest-File-First: despachar primero la respuesta estimada más pequeña
    Sff,
}

impl SchedPolicy {
    /// Parsea el algoritmo desde la configuración.
    ///
    /// `"SFF"` (case-insensitive) selecciona SFF; cualquier otro valor cae a
    /// FIFO, que es el default.
    ///
    /// # Ejemplo
    /// ```
    /// use sff_server::sched::SchedPolicy;
    ///
    /// assert_eq!(SchedPolicy::from_str("sff"), SchedPolicy::Sff);
    /// assert_eq!(SchedPolicy::from_str("FIFO"), SchedPolicy::Fifo);
    /// assert_eq!(SchedPolicy::from_str("whatever"), SchedPolicy::Fifo);
    /// ```
    pub fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("SFF") {
            SchedPolicy::Sff
        } else {
            SchedPolicy::Fifo
        }
    }

    /// Comparador total entre dos peticiones pendientes.
    ///
    /// - FIFO: por `seq` ascendente.
    /// - SFF: por `cost_hint` ascendente; empates (incluidos dos centinelas
    ///   `COST_UNKNOWN`) se rompen por `seq` ascendente.
    ///
    /// Cualquier estructura interna de la cola debe preservar exactamente
    /// este resultado, incluido el desempate, para que el orden de admisión
    /// sea determinista entre peticiones de igual costo.
    pub fn cmp<C>(&self, a: &Request<C>, b: &Request<C>) -> Ordering {
        match self {
            SchedPolicy::Fifo => a.seq().cmp(&b.seq()),
            SchedPolicy::Sff => a
                .cost_hint()
                .cmp(&b.cost_hint())
                .then(a.seq().cmp(&b.seq())),
        }
    }

    /// Nombre legible de la política
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedPolicy::Fifo => "FIFO",
            SchedPolicy::Sff => "SFF",
        }
    }
}
