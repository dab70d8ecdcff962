//! Tests for qubit memory allocators and reset-epoch semantics.

use std::rc::Rc;

use embla_hal::{BackendOptions, MockFactory, StateBackend};
use embla_runtime::{
    DynamicMemory, MockMemory, QubitMemory, QuantumRegister, RuntimeError, StackMemory,
};

fn stack(total: usize) -> (StackMemory, MockFactory) {
    let factory = MockFactory::new();
    let memory = StackMemory::new(
        Box::new(factory.clone()),
        BackendOptions::default(),
        total,
    )
    .unwrap();
    (memory, factory)
}

// ---------------------------------------------------------------------------
// Fixed-capacity allocation
// ---------------------------------------------------------------------------

#[test]
fn stack_exact_fit_then_overflow() {
    let (mut memory, _) = stack(4);
    assert_eq!(memory.allocate(4).unwrap(), vec![0, 1, 2, 3]);

    match memory.allocate(1).unwrap_err() {
        RuntimeError::CapacityExceeded { total, allocated } => {
            assert_eq!(total, 4);
            assert_eq!(allocated, 5);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn stack_addresses_never_overlap() {
    let (mut memory, _) = stack(6);
    let a = memory.allocate(2).unwrap();
    let b = memory.allocate(3).unwrap();
    let c = memory.allocate(1).unwrap();

    let mut all: Vec<usize> = a.into_iter().chain(b).chain(c).collect();
    all.sort_unstable();
    all.dedup();
    assert_eq!(all, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn stack_error_reports_would_be_cursor() {
    let (mut memory, _) = stack(2);
    memory.allocate(1).unwrap();
    let message = memory.allocate(5).unwrap_err().to_string();
    assert!(message.contains("2 qubits"));
    assert!(message.contains("6 allocated"));
}

// ---------------------------------------------------------------------------
// Reset epochs
// ---------------------------------------------------------------------------

#[test]
fn reset_rewinds_cursor_and_replaces_handle() {
    let (mut memory, factory) = stack(3);
    let epoch_one = memory.backend();
    memory.allocate(3).unwrap();

    memory.reset().unwrap();
    let epoch_two = memory.backend();

    assert_eq!(memory.allocate(2).unwrap(), vec![0, 1]);
    assert!(!Rc::ptr_eq(&epoch_one, &epoch_two));
    assert_eq!(factory.created().len(), 2);
}

#[test]
fn registers_keep_their_epoch_backend_across_reset() {
    let (mut memory, _) = stack(2);
    let addrs = memory.allocate(2).unwrap();
    let reg = QuantumRegister::new(memory.backend(), addrs);
    let old_handle = reg.backend();

    memory.reset().unwrap();

    // The register still points at the pre-reset handle, untouched by the
    // reset; only new registers see the new one.
    assert!(Rc::ptr_eq(&old_handle, &reg.backend()));
    assert!(!Rc::ptr_eq(&old_handle, &memory.backend()));
}

#[test]
fn reset_preserves_total() {
    let (mut memory, _) = stack(2);
    memory.allocate(2).unwrap();
    memory.reset().unwrap();
    memory.allocate(2).unwrap();
    assert!(matches!(
        memory.allocate(1),
        Err(RuntimeError::CapacityExceeded { total: 2, .. })
    ));
}

// ---------------------------------------------------------------------------
// Growable allocation
// ---------------------------------------------------------------------------

#[test]
fn dynamic_allocates_through_backend() {
    let factory = MockFactory::new();
    let mut memory =
        DynamicMemory::new(Box::new(factory.clone()), BackendOptions::default()).unwrap();

    assert_eq!(memory.allocate(2).unwrap(), vec![0, 1]);
    assert_eq!(memory.allocate(1).unwrap(), vec![2]);

    let backend = factory.latest().unwrap();
    assert_eq!(backend.borrow().num_qubits(), 3);
    // Three allocate_qubit calls reached the engine, one per new address.
    assert_eq!(backend.borrow().call_count(), 3);
}

#[test]
fn dynamic_tensor_network_rejected_at_construction() {
    let factory = MockFactory::new();
    let options = BackendOptions::default().with_tensor_network(true);
    let err = DynamicMemory::new(Box::new(factory), options).err();
    assert!(matches!(
        err,
        Some(RuntimeError::UnsupportedBackendMode(_))
    ));
}

// ---------------------------------------------------------------------------
// Mock allocator contract
// ---------------------------------------------------------------------------

#[test]
fn mock_memory_matches_stack_contract() {
    let mut memory = MockMemory::new(3);
    assert_eq!(memory.allocate(0).unwrap(), Vec::<usize>::new());
    assert_eq!(memory.allocate(3).unwrap(), vec![0, 1, 2]);
    assert!(matches!(
        memory.allocate(1),
        Err(RuntimeError::CapacityExceeded {
            total: 3,
            allocated: 4
        })
    ));
    memory.reset().unwrap();
    assert_eq!(memory.allocate(1).unwrap(), vec![0]);
}
