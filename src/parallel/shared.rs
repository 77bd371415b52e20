//! Row-disjoint shared access to a mutable slice.
//!
//! The iteration engine hands the same `x`, `y` and per-rank slot buffers to
//! every worker. Writes are partitioned by row ownership and reads of another
//! thread's rows only happen after a barrier, so the buffers need no per-element
//! locking. `SharedSlice` carries that contract: it is `Sync`, and every access
//! is `unsafe` with the phase discipline as the caller's obligation.

use std::marker::PhantomData;

/// Shared view of a `&mut [T]` whose elements are written by disjoint owners.
#[derive(Debug)]
pub struct SharedSlice<'a, T> {
    ptr: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

// SAFETY: the view is only a capability to reach the elements; the callers of
// the unsafe accessors guarantee that no element is written while any other
// thread reads or writes it.
unsafe impl<T: Send> Send for SharedSlice<'_, T> {}
unsafe impl<T: Send + Sync> Sync for SharedSlice<'_, T> {}

impl<'a, T: Copy> SharedSlice<'a, T> {
    pub fn new(data: &'a mut [T]) -> Self {
        Self {
            ptr: data.as_mut_ptr(),
            len: data.len(),
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Write element `i`.
    ///
    /// # Safety
    /// No other thread may access element `i` until the next synchronization point.
    #[inline]
    pub unsafe fn write(&self, i: usize, value: T) {
        assert!(i < self.len, "index {i} out of bounds for length {}", self.len);
        // SAFETY: in bounds; exclusivity is the caller's contract.
        unsafe { self.ptr.add(i).write(value) }
    }

    /// Read element `i`.
    ///
    /// # Safety
    /// No thread may be writing element `i` concurrently.
    #[inline]
    pub unsafe fn read(&self, i: usize) -> T {
        assert!(i < self.len, "index {i} out of bounds for length {}", self.len);
        // SAFETY: in bounds; absence of writers is the caller's contract.
        unsafe { self.ptr.add(i).read() }
    }

    /// Borrow the whole buffer read-only for one phase.
    ///
    /// # Safety
    /// No thread may write any element while the returned slice is alive.
    #[inline]
    pub unsafe fn as_slice(&self) -> &[T] {
        // SAFETY: ptr/len come from a live `&'a mut [T]`; no writers is the caller's contract.
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn disjoint_writers_fill_the_buffer() {
        let mut data = vec![0usize; 64];
        {
            let shared = SharedSlice::new(&mut data);
            thread::scope(|s| {
                for rank in 0..4 {
                    let shared = &shared;
                    s.spawn(move || {
                        for i in (rank..64).step_by(4) {
                            unsafe { shared.write(i, i * 10) };
                        }
                    });
                }
            });
            assert_eq!(unsafe { shared.read(5) }, 50);
            assert_eq!(shared.len(), 64);
        }
        assert!(data.iter().enumerate().all(|(i, &v)| v == i * 10));
    }
}
