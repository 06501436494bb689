//! Shared-ownership primitive used for values that outlive a single borrow of a `Repository`,
//! like the `packed-refs` buffer or a loaded pack index.
//!
//! Without the `threading` feature this is a plain [`Rc`][std::rc::Rc]; with it, an [`Arc`].

#[cfg(not(feature = "threading"))]
pub type OwnShared<T> = std::rc::Rc<T>;

#[cfg(feature = "threading")]
pub type OwnShared<T> = std::sync::Arc<T>;

#[cfg(not(feature = "threading"))]
pub type MutableShared<T> = std::cell::RefCell<T>;

#[cfg(feature = "threading")]
pub type MutableShared<T> = std::sync::RwLock<T>;
