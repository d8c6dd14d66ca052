//! # Cola de Peticiones Acotada
//! src/sched/queue.rs
//!
//! Implementa la cola de prioridad acotada y thread-safe que media entre el
//! aceptador (productor único) y el pool de workers (consumidores).
//!
//! ## Sincronización
//!
//! Un único `Mutex` protege todo el estado interno; dos `Condvar` cubren las
//! dos condiciones de bloqueo:
//! - `not_full`: el aceptador espera mientras la cola está llena (backpressure)
//! - `not_empty`: los workers esperan mientras la cola está vacía
//!
//! Ambas esperas son loops que re-verifican la condición, para tolerar
//! despertares espurios y múltiples esperadores compitiendo.
//!
//! ## Estructura interna
//!
//! Min-heap binario indexado sobre un `Vec` propio, reservado una sola vez a
//! la capacidad configurada. El comparador de [`SchedPolicy`] es la única
//! fuente de verdad del orden, incluido el desempate por secuencia.

use crate::sched::policy::SchedPolicy;
use crate::sched::request::Request;
use serde::Serialize;
use std::sync::{Condvar, Mutex};
use std::thread;
use std::time::Duration;

/// Cola de prioridad acotada con bloqueo productor/consumidor
pub struct RequestQueue<C> {
    /// Estado interno: el heap de peticiones pendientes
    inner: Mutex<Heap<C>>,

    /// Señal para workers esperando peticiones
    not_empty: Condvar,

    /// Señal para el aceptador esperando espacio
    not_full: Condvar,

    /// Capacidad fija, decidida al arranque
    capacity: usize,

    /// Política de despacho, fija para todo el proceso
    policy: SchedPolicy,

    /// Ventana de espera del despacho SFF (0 la desactiva)
    sff_delay: Duration,
}

/// Min-heap binario indexado sobre un buffer contiguo propio
struct Heap<C> {
    items: Vec<Request<C>>,
    policy: SchedPolicy,
}

impl<C> Heap<C> {
    fn with_capacity(capacity: usize, policy: SchedPolicy) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            policy,
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    /// Inserta manteniendo la propiedad de heap.
    ///
    /// Insertar con el heap lleno indica un bug de sincronización (el
    /// productor debe haber esperado en `not_full`): abortamos en vez de
    /// corromper el estado.
    fn insert(&mut self, req: Request<C>, capacity: usize) {
        if self.items.len() >= capacity {
            panic!("request heap is full while inserting (synchronization bug)");
        }
        self.items.push(req);
        self.sift_up(self.items.len() - 1);
    }

    /// Extrae el mínimo según el comparador de la política.
    ///
    /// Extraer con el heap vacío es inalcanzable dado el contrato de bloqueo;
    /// si ocurre es un bug de sincronización y abortamos.
    fn extract_min(&mut self) -> Request<C> {
        if self.items.is_empty() {
            panic!("request heap is empty on extract (synchronization bug)");
        }
        let min = self.items.swap_remove(0);
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        min
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.policy.cmp(&self.items[index], &self.items[parent]).is_lt() {
                self.items.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        loop {
            let mut smallest = index;
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            if left < self.items.len()
                && self.policy.cmp(&self.items[left], &self.items[smallest]).is_lt()
            {
                smallest = left;
            }
            if right < self.items.len()
                && self.policy.cmp(&self.items[right], &self.items[smallest]).is_lt()
            {
                smallest = right;
            }
            if smallest != index {
                self.items.swap(index, smallest);
                index = smallest;
            } else {
                break;
            }
        }
    }
}

impl<C> RequestQueue<C> {
    /// Crea una cola con capacidad fija, política y ventana SFF
    pub fn new(capacity: usize, policy: SchedPolicy, sff_delay: Duration) -> Self {
        Self {
            inner: Mutex::new(Heap::with_capacity(capacity, policy)),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
            policy,
            sff_delay,
        }
    }

    /// Encola una petición, bloqueando mientras la cola esté llena.
    ///
    /// Nunca descarta una petición y nunca supera la capacidad. Al insertar
    /// despierta a un worker esperando en `dequeue_min`.
    pub fn enqueue(&self, req: Request<C>) {
        let mut heap = self.inner.lock().unwrap();
        while heap.len() == self.capacity {
            heap = self.not_full.wait(heap).unwrap();
        }
        heap.insert(req, self.capacity);
        self.not_empty.notify_one();
    }

    /// Desencola la petición de mayor prioridad, bloqueando mientras la cola
    /// esté vacía. Al extraer despierta al productor esperando espacio.
    ///
    /// ## Ventana de espera SFF
    ///
    /// Si la política es SFF y al despertar la ocupación es exactamente 1,
    /// una sola petición conocida es una señal débil: el worker suelta el
    /// lock, duerme la ventana configurada y luego extrae el mínimo real
    /// sobre lo que se haya acumulado. La espera se aplica a lo sumo una vez
    /// por intento de desencole, y se omite si ya hay 2+ encoladas o bajo
    /// FIFO. Si durante la ventana otro worker vació la cola, se vuelve al
    /// loop de espera sin re-aplicar la ventana, de modo que la extracción
    /// sobre cola vacía sigue siendo inalcanzable.
    pub fn dequeue_min(&self) -> Request<C> {
        let mut heap = self.inner.lock().unwrap();
        let mut delayed = false;
        loop {
            while heap.len() == 0 {
                heap = self.not_empty.wait(heap).unwrap();
            }

            if !delayed
                && self.policy == SchedPolicy::Sff
                && heap.len() == 1
                && !self.sff_delay.is_zero()
            {
                delayed = true;
                drop(heap);
                thread::sleep(self.sff_delay);
                heap = self.inner.lock().unwrap();
                continue;
            }

            break;
        }
        let req = heap.extract_min();
        self.not_full.notify_one();
        req
    }

    /// Ocupación actual de la cola
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Verifica si la cola está vacía
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacidad fija de la cola
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Política de despacho activa
    pub fn policy(&self) -> SchedPolicy {
        self.policy
    }

    /// Snapshot de estadísticas de la cola (para /metrics)
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            pending: self.len(),
            capacity: self.capacity,
            policy: self.policy,
            sff_delay_ms: self.sff_delay.as_millis() as u64,
        }
    }
}

/// Estadísticas de la cola en un instante dado
#[derive(Debug, Clone, Serialize)]
pub struct QueueStats {
    pub pending: usize,
    pub capacity: usize,
    pub policy: SchedPolicy,
    pub sff_delay_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::request::COST_UNKNOWN;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::time::Instant;

    const NO_DELAY: Duration = Duration::ZERO;

    fn queue(capacity: usize, policy: SchedPolicy) -> RequestQueue<u32> {
        RequestQueue::new(capacity, policy, NO_DELAY)
    }

    // ==================== Ordenamiento ====================

    #[test]
    fn test_fifo_dequeues_in_admission_order() {
        let q = queue(3, SchedPolicy::Fifo);
        // Los costos no importan bajo FIFO, aunque estén seteados
        q.enqueue(Request::new(1, 900, 0));
        q.enqueue(Request::new(2, 5, 1));
        q.enqueue(Request::new(3, 400, 2));

        assert_eq!(q.dequeue_min().into_conn(), 1);
        assert_eq!(q.dequeue_min().into_conn(), 2);
        assert_eq!(q.dequeue_min().into_conn(), 3);
    }

    #[test]
    fn test_sff_dequeues_smallest_cost_first() {
        let q = queue(3, SchedPolicy::Sff);
        q.enqueue(Request::new(1, 500, 0));
        q.enqueue(Request::new(2, 100, 1));
        q.enqueue(Request::new(3, 300, 2));

        assert_eq!(q.dequeue_min().into_conn(), 2);
        assert_eq!(q.dequeue_min().into_conn(), 3);
        assert_eq!(q.dequeue_min().into_conn(), 1);
    }

    #[test]
    fn test_sff_tie_break_by_sequence() {
        let q = queue(4, SchedPolicy::Sff);
        q.enqueue(Request::new(10, 100, 0));
        q.enqueue(Request::new(11, 100, 1));
        q.enqueue(Request::new(12, 100, 2));

        // Igual costo: salen en orden de admisión
        assert_eq!(q.dequeue_min().into_conn(), 10);
        assert_eq!(q.dequeue_min().into_conn(), 11);
        assert_eq!(q.dequeue_min().into_conn(), 12);
    }

    #[test]
    fn test_cost_unknown_always_dequeues_last() {
        let q = queue(4, SchedPolicy::Sff);
        // Simula un stat fallido: centinela COST_UNKNOWN
        q.enqueue(Request::new(1, COST_UNKNOWN, 0));
        q.enqueue(Request::new(2, 999_999, 1));
        q.enqueue(Request::new(3, COST_UNKNOWN, 2));
        q.enqueue(Request::new(4, 1, 3));

        assert_eq!(q.dequeue_min().into_conn(), 4);
        assert_eq!(q.dequeue_min().into_conn(), 2);
        // Los dos centinelas desempatan por secuencia
        assert_eq!(q.dequeue_min().into_conn(), 1);
        assert_eq!(q.dequeue_min().into_conn(), 3);
    }

    // ==================== Ocupación y capacidad ====================

    #[test]
    fn test_occupancy_stays_within_bounds() {
        let q = queue(2, SchedPolicy::Fifo);
        assert_eq!(q.len(), 0);
        assert!(q.is_empty());

        q.enqueue(Request::new(1, 0, 0));
        assert_eq!(q.len(), 1);
        q.enqueue(Request::new(2, 0, 1));
        assert_eq!(q.len(), 2);
        assert_eq!(q.capacity(), 2);

        q.dequeue_min();
        assert_eq!(q.len(), 1);
        q.dequeue_min();
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn test_backpressure_blocks_until_dequeue() {
        let q = Arc::new(queue(1, SchedPolicy::Fifo));
        q.enqueue(Request::new(1, 0, 0));

        let (tx, rx) = mpsc::channel();
        let producer = thread::spawn({
            let q = Arc::clone(&q);
            move || {
                // Debe bloquear: la cola está llena
                q.enqueue(Request::new(2, 0, 1));
                tx.send(()).unwrap();
            }
        });

        // El productor no debe completar mientras nadie desencola
        assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());

        // Al desencolar se libera el espacio y el enqueue bloqueado termina
        assert_eq!(q.dequeue_min().into_conn(), 1);
        rx.recv_timeout(Duration::from_secs(2))
            .expect("enqueue should unblock after a dequeue");
        producer.join().unwrap();

        assert_eq!(q.dequeue_min().into_conn(), 2);
    }

    #[test]
    fn test_dequeue_blocks_until_enqueue() {
        let q = Arc::new(queue(1, SchedPolicy::Fifo));

        let (tx, rx) = mpsc::channel();
        let consumer = thread::spawn({
            let q = Arc::clone(&q);
            move || {
                let req = q.dequeue_min();
                tx.send(req.into_conn()).unwrap();
            }
        });

        assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());

        q.enqueue(Request::new(7, 0, 0));
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2))
                .expect("dequeue should unblock after an enqueue"),
            7
        );
        consumer.join().unwrap();
    }

    // ==================== Ventana de espera SFF ====================

    #[test]
    fn test_sff_delay_changes_outcome() {
        // Con una sola petición conocida, el worker espera la ventana y una
        // petición más barata que llega durante la espera gana el despacho.
        let q = Arc::new(RequestQueue::new(
            4,
            SchedPolicy::Sff,
            Duration::from_millis(200),
        ));
        q.enqueue(Request::new(1, 1000, 0));

        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn({
            let q = Arc::clone(&q);
            move || {
                tx.send(q.dequeue_min().into_conn()).unwrap();
            }
        });

        // Llega una petición pequeña dentro de la ventana
        thread::sleep(Duration::from_millis(50));
        q.enqueue(Request::new(2, 10, 1));

        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            2,
            "the small request arriving during the window must win"
        );
        worker.join().unwrap();
        assert_eq!(q.dequeue_min().into_conn(), 1);
    }

    #[test]
    fn test_sff_delay_skipped_when_two_already_queued() {
        let q = RequestQueue::new(4, SchedPolicy::Sff, Duration::from_millis(300));
        q.enqueue(Request::new(1, 500, 0));
        q.enqueue(Request::new(2, 100, 1));

        // Con 2+ encoladas la ventana no aplica: el despacho es inmediato
        let start = Instant::now();
        assert_eq!(q.dequeue_min().into_conn(), 2);
        assert!(
            start.elapsed() < Duration::from_millis(150),
            "no delay window should apply with two requests queued"
        );
    }

    #[test]
    fn test_no_delay_under_fifo() {
        let q = RequestQueue::new(4, SchedPolicy::Fifo, Duration::from_millis(300));
        q.enqueue(Request::new(1, 0, 0));

        let start = Instant::now();
        assert_eq!(q.dequeue_min().into_conn(), 1);
        assert!(start.elapsed() < Duration::from_millis(150));
    }

    #[test]
    fn test_zero_delay_disables_window() {
        let q = RequestQueue::new(4, SchedPolicy::Sff, Duration::ZERO);
        q.enqueue(Request::new(1, 500, 0));

        let start = Instant::now();
        assert_eq!(q.dequeue_min().into_conn(), 1);
        assert!(start.elapsed() < Duration::from_millis(150));
    }

    // ==================== Estadísticas ====================

    #[test]
    fn test_queue_stats_snapshot() {
        let q = RequestQueue::new(8, SchedPolicy::Sff, Duration::from_millis(200));
        q.enqueue(Request::new(1u32, 10, 0));
        q.enqueue(Request::new(2u32, 20, 1));

        let stats = q.stats();
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.capacity, 8);
        assert_eq!(stats.policy, SchedPolicy::Sff);
        assert_eq!(stats.sff_delay_ms, 200);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["pending"], 2);
        assert_eq!(json["policy"], "SFF");
    }
}
