//! The two callback shapes a timer can hold.

/// A timer callback, either plain or carrying a user parameter.
///
/// The parameter is copied into the slot. Anything it points at stays owned by
/// the caller, which is why `C` is usually a `&'static` reference or an index.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Callback<C> {
    Plain(fn()),
    WithParam(fn(C), C),
}

impl<C: Copy> Callback<C> {
    #[inline]
    pub(crate) fn invoke(&self) {
        match *self {
            Callback::Plain(f) => f(),
            Callback::WithParam(f, param) => f(param),
        }
    }
}
