use std::cell::RefCell;

use crate::errors::ResolveErrorKind;

thread_local! {
    // Registrations currently being constructed on this thread, outermost first.
    static RESOLVING: RefCell<Vec<(usize, &'static str)>> = const { RefCell::new(Vec::new()) };
}

/// RAII guard that detects dependency cycles.
///
/// Entering pushes the registration onto the thread-local resolution stack and fails
/// if it is already there. Dropping the guard pops it.
pub(crate) struct ResolutionGuard {
    id: usize,
}

impl ResolutionGuard {
    pub(crate) fn enter(id: usize, contract: &'static str) -> Result<Self, ResolveErrorKind> {
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(position) = stack.iter().position(|(entered, _)| *entered == id) {
                let mut path = stack[position..].iter().map(|(_, name)| *name).collect::<Vec<_>>();
                path.push(contract);
                return Err(ResolveErrorKind::CyclicDependency { path: path.join(" -> ") });
            }
            stack.push((id, contract));
            Ok(Self { id })
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(position) = stack.iter().rposition(|(entered, _)| *entered == self.id) {
                stack.remove(position);
            }
        });
    }
}
