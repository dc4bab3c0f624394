//! A scoped guard around the platform's interrupt mask.
//!
//! The radio completion interrupt, the system tick interrupt and the task that
//! dispatches events all touch the same link layer fields. Every mutation of
//! those fields is bracketed by an [`IrqGuard`], which masks interrupts on
//! construction and restores the previous mask when dropped (on every exit path).
//!
//! The actual masking primitive is provided by whatever `critical-section`
//! implementation the final binary links in.

use core::marker::PhantomData;

use critical_section::RestoreState;

/// Masks interrupts for as long as it is alive.
///
/// Guards may be nested; inner guards restore to the state captured by the outer guard.
pub(crate) struct IrqGuard {
    restore: RestoreState,
    // the restore token belongs to the context that acquired it
    _not_send: PhantomData<*mut ()>,
}

impl IrqGuard {
    /// Enter a critical section.
    pub(crate) fn acquire() -> Self {
        // SAFETY: the matching release happens in `Drop`. Guards are only ever held
        // as scoped locals, so they are released in reverse order of acquisition.
        let restore = unsafe { critical_section::acquire() };
        Self {
            restore,
            _not_send: PhantomData,
        }
    }
}

impl Drop for IrqGuard {
    fn drop(&mut self) {
        // SAFETY: `restore` was returned by the `acquire()` call in `IrqGuard::acquire()`.
        unsafe { critical_section::release(self.restore) }
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    use super::IrqGuard;

    #[test]
    fn nested_guards() {
        let outer = IrqGuard::acquire();
        {
            let _inner = IrqGuard::acquire();
        }
        drop(outer);
        // a fresh section can still be entered after both are released
        let _again = IrqGuard::acquire();
    }

    #[test]
    fn guard_released_on_early_return() {
        fn bail(flag: bool) -> Option<u8> {
            let _guard = IrqGuard::acquire();
            if flag {
                return None;
            }
            Some(1)
        }
        assert_eq!(bail(true), None);
        assert_eq!(bail(false), Some(1));
        critical_section::with(|_| {});
    }
}
