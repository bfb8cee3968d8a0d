// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed construct/destroy facade over a [`PoolRouter`].
//!
//! Mirrors the reference design's `newElement<T>()` / `deleteElement<T>()` templates: the caller
//! works with `T` directly instead of raw bytes, and the router picks the size class.

use crate::error::PoolResult;
use crate::router::PoolRouter;
use std::mem::size_of;
use std::ptr::{self, NonNull};

/// Allocate space for a `T` from `router` and move `value` into it.
///
/// Returns `Ok(None)` for a zero-sized `T`: there is nothing to allocate or initialize, and
/// [`delete_element`] treats `None` as the matching no-op.
///
/// # Errors
///
/// Propagates whatever [`PoolRouter::use_memory`] returns.
pub fn new_element<T>(router: &PoolRouter, value: T) -> PoolResult<Option<NonNull<T>>> {
    if size_of::<T>() == 0 {
        // Nothing to store; drop immediately rather than leak `value`'s destructor call.
        drop(value);
        return Ok(None);
    }

    let raw = router.use_memory(size_of::<T>())?;
    let raw = raw.expect("use_memory returns Some for a nonzero size");
    let typed: NonNull<T> = raw.cast();

    // SAFETY: `typed` points at `size_of::<T>()` freshly allocated, properly aligned* bytes
    // owned exclusively by this call. (*`router`'s slot classes are 8-byte granular; callers
    // requiring stricter alignment than 8 bytes are out of scope, matching the reference design.)
    unsafe { ptr::write(typed.as_ptr(), value) };

    Ok(Some(typed))
}

/// Run `T`'s destructor and return its memory to `router`.
///
/// `p` must be `None` iff it was produced by a [`new_element::<T>`] call that itself returned
/// `None` (zero-sized `T`). A `None` here is a no-op, matching that case.
///
/// # Safety-relevant contract
///
/// `p`, when `Some`, must be a pointer returned by [`new_element::<T>`] against this same
/// `router` that has not already been passed to `delete_element`.
pub fn delete_element<T>(router: &PoolRouter, p: Option<NonNull<T>>) {
    let Some(p) = p else { return };

    // SAFETY: caller contract guarantees `p` is live and uniquely owned.
    unsafe { ptr::drop_in_place(p.as_ptr()) };

    router.free_memory(Some(p.cast()), size_of::<T>());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::PoolRouter;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn round_trips_a_plain_value() {
        let router = PoolRouter::new().unwrap();
        let p = new_element(&router, 42u64).unwrap().unwrap();
        assert_eq!(unsafe { *p.as_ptr() }, 42);
        delete_element(&router, Some(p));
    }

    #[test]
    fn constructor_and_destructor_each_run_exactly_once() {
        struct Counted(Rc<RefCell<(u32, u32)>>);
        impl Counted {
            fn new(counts: Rc<RefCell<(u32, u32)>>) -> Self {
                counts.borrow_mut().0 += 1;
                Self(counts)
            }
        }
        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.borrow_mut().1 += 1;
            }
        }

        let router = PoolRouter::new().unwrap();
        let counts = Rc::new(RefCell::new((0u32, 0u32)));

        let value = Counted::new(counts.clone());
        assert_eq!(*counts.borrow(), (1, 0));

        let p = new_element(&router, value).unwrap().unwrap();
        assert_eq!(*counts.borrow(), (1, 0));

        delete_element(&router, Some(p));
        assert_eq!(*counts.borrow(), (1, 1));
    }

    #[test]
    fn zero_sized_type_is_a_no_op_round_trip() {
        let router = PoolRouter::new().unwrap();
        let p = new_element(&router, ()).unwrap();
        assert!(p.is_none());
        delete_element(&router, p);
    }

    #[test]
    fn oversized_type_escalates_through_the_router() {
        let router = PoolRouter::new().unwrap();
        let big = [0u8; 1024];
        let p = new_element(&router, big).unwrap().unwrap();
        assert_eq!(unsafe { (*p.as_ptr())[0] }, 0);
        delete_element(&router, Some(p));
    }
}
