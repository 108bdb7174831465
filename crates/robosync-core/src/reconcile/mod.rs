// ── Reconcilers ──
//
// One reconciler per resource kind. Each is a thin orchestrator over the
// sanitizer, differencer and encoder, holding only its injected backend,
// so distinct resources may be reconciled from parallel tasks.

pub mod firewall;
pub mod vswitch;
