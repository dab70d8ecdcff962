//! Qubit memory allocators.
//!
//! An allocator owns the mapping from logical qubit counts to backend
//! addresses. Addresses come into existence *only* through
//! [`QubitMemory::allocate`]; they are strictly increasing, non-overlapping,
//! and valid until the next [`reset`](QubitMemory::reset). A reset replaces
//! the backend handle through the configured [`BackendFactory`] — it never
//! mutates the old handle, so registers created before the reset keep
//! observing the state they were bound to.

use std::rc::Rc;

use tracing::debug;

use embla_hal::{BackendFactory, BackendOptions, MockBackend, SharedBackend};

use crate::error::{RuntimeError, RuntimeResult};

/// Allocation and reset contract shared by all memory disciplines.
pub trait QubitMemory {
    /// Allocate `n` qubits, returning their backend addresses in order.
    fn allocate(&mut self, n: usize) -> RuntimeResult<Vec<usize>>;

    /// Discard the current backend handle, acquire a fresh one, and rewind
    /// the address cursor to zero. The shot boundary.
    fn reset(&mut self) -> RuntimeResult<()>;

    /// Handle to the backend of the current reset epoch.
    fn backend(&self) -> SharedBackend;
}

/// Fixed-capacity allocator.
///
/// The backend is sized to `total` qubits up front; `allocate` only advances
/// a cursor and fails with [`RuntimeError::CapacityExceeded`] once the cursor
/// would pass `total`. `reset` rebuilds the backend and rewinds the cursor
/// but never alters `total`.
pub struct StackMemory {
    factory: Box<dyn BackendFactory>,
    options: BackendOptions,
    backend: SharedBackend,
    total: usize,
    allocated: usize,
}

impl StackMemory {
    /// Build a fixed-capacity allocator holding `total` qubits.
    ///
    /// `options.qubit_count` is pinned to `total` so every reset constructs
    /// a backend of the same size.
    pub fn new(
        factory: Box<dyn BackendFactory>,
        options: BackendOptions,
        total: usize,
    ) -> RuntimeResult<Self> {
        let options = options.with_qubit_count(total);
        let backend = factory.create(&options)?;
        Ok(Self {
            factory,
            options,
            backend,
            total,
            allocated: 0,
        })
    }

    /// Capacity of this allocator.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Current cursor value.
    pub fn allocated(&self) -> usize {
        self.allocated
    }
}

impl QubitMemory for StackMemory {
    fn allocate(&mut self, n: usize) -> RuntimeResult<Vec<usize>> {
        let start = self.allocated;
        let end = start + n;
        if end > self.total {
            return Err(RuntimeError::CapacityExceeded {
                total: self.total,
                allocated: end,
            });
        }
        self.allocated = end;
        debug!(n, start, "allocated qubit block");
        Ok((start..end).collect())
    }

    fn reset(&mut self) -> RuntimeResult<()> {
        debug!(total = self.total, "resetting stack memory");
        self.backend = self.factory.create(&self.options)?;
        self.allocated = 0;
        Ok(())
    }

    fn backend(&self) -> SharedBackend {
        Rc::clone(&self.backend)
    }
}

/// Growable allocator.
///
/// No capacity ceiling of its own: the backend's current register size is
/// the cursor, and each allocation instructs the backend to bring `n` new
/// qubits into existence. Whatever resource ceiling exists is the backend's
/// to report, as a [`BackendError`](embla_hal::BackendError).
///
/// Tensor-network engines cannot grow their register incrementally, so
/// construction and every reset reject them with
/// [`RuntimeError::UnsupportedBackendMode`].
pub struct DynamicMemory {
    factory: Box<dyn BackendFactory>,
    options: BackendOptions,
    backend: SharedBackend,
}

impl std::fmt::Debug for DynamicMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicMemory").finish_non_exhaustive()
    }
}

impl DynamicMemory {
    /// Build a growable allocator.
    pub fn new(factory: Box<dyn BackendFactory>, options: BackendOptions) -> RuntimeResult<Self> {
        let backend = Self::create_checked(factory.as_ref(), &options)?;
        Ok(Self {
            factory,
            options,
            backend,
        })
    }

    fn create_checked(
        factory: &dyn BackendFactory,
        options: &BackendOptions,
    ) -> RuntimeResult<SharedBackend> {
        let backend = factory.create(options)?;
        if backend.borrow().is_tensor_network() {
            return Err(RuntimeError::UnsupportedBackendMode(
                "growable allocation does not support tensor-network backends".into(),
            ));
        }
        Ok(backend)
    }
}

impl QubitMemory for DynamicMemory {
    fn allocate(&mut self, n: usize) -> RuntimeResult<Vec<usize>> {
        let mut backend = self.backend.borrow_mut();
        let start = backend.num_qubits();
        for index in start..start + n {
            backend.allocate_qubit(index)?;
        }
        debug!(n, start, "grew backend register");
        Ok((start..start + n).collect())
    }

    fn reset(&mut self) -> RuntimeResult<()> {
        debug!("resetting dynamic memory");
        self.backend = Self::create_checked(self.factory.as_ref(), &self.options)?;
        Ok(())
    }

    fn backend(&self) -> SharedBackend {
        Rc::clone(&self.backend)
    }
}

/// Fixed-capacity allocator with no real backend state behind it.
///
/// Same cursor contract as [`StackMemory`], used to verify the allocation
/// contract without constructing an engine.
pub struct MockMemory {
    backend: SharedBackend,
    total: usize,
    allocated: usize,
}

impl MockMemory {
    /// Build a mock allocator holding `total` qubits.
    pub fn new(total: usize) -> Self {
        Self {
            backend: MockBackend::new(total).shared(),
            total,
            allocated: 0,
        }
    }
}

impl QubitMemory for MockMemory {
    fn allocate(&mut self, n: usize) -> RuntimeResult<Vec<usize>> {
        let start = self.allocated;
        let end = start + n;
        if end > self.total {
            return Err(RuntimeError::CapacityExceeded {
                total: self.total,
                allocated: end,
            });
        }
        self.allocated = end;
        Ok((start..end).collect())
    }

    fn reset(&mut self) -> RuntimeResult<()> {
        self.backend = MockBackend::new(self.total).shared();
        self.allocated = 0;
        Ok(())
    }

    fn backend(&self) -> SharedBackend {
        Rc::clone(&self.backend)
    }
}
