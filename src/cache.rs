use std::{
    any::Any,
    borrow::Cow,
    collections::HashMap,
    convert::Infallible,
    hash::Hash,
    ops::Deref,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use derive_ex::derive_ex;
use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

use crate::CacheError;

#[cfg(test)]
mod tests;

/// Identity of a cached function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize)]
#[display("{0}")]
pub struct FunctionId(Cow<'static, str>);

impl FunctionId {
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<&'static str> for FunctionId {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}
impl From<String> for FunctionId {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

/// How a cached value is handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromStr, Serialize, Deserialize)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Every retrieval returns an independent copy.
    Data,
    /// Every retrieval returns the same shared instance.
    Resource,
}

/// A value returned by [`CacheTable::get_or_compute`].
#[derive(Debug)]
pub enum Cached<T> {
    Copied(T),
    Shared(Arc<T>),
}
impl<T> Cached<T> {
    pub fn mode(&self) -> CacheMode {
        match self {
            Self::Copied(_) => CacheMode::Data,
            Self::Shared(_) => CacheMode::Resource,
        }
    }
    pub fn into_owned(self) -> T
    where
        T: Clone,
    {
        match self {
            Self::Copied(value) => value,
            Self::Shared(value) => Arc::unwrap_or_clone(value),
        }
    }
    pub fn into_shared(self) -> Arc<T> {
        match self {
            Self::Copied(value) => Arc::new(value),
            Self::Shared(value) => value,
        }
    }
}
impl<T> Deref for Cached<T> {
    type Target = T;
    fn deref(&self) -> &T {
        match self {
            Self::Copied(value) => value,
            Self::Shared(value) => value,
        }
    }
}

trait EntryTable: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Returns `None` if `args` is not of the table's argument type.
    fn remove(&mut self, args: &dyn Any) -> Option<bool>;
    fn len(&self) -> usize;
}

struct Entries<A, T>(HashMap<A, Arc<T>>);

impl<A, T> EntryTable for Entries<A, T>
where
    A: Hash + Eq + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn remove(&mut self, args: &dyn Any) -> Option<bool> {
        let args = args.downcast_ref::<A>()?;
        Some(self.0.remove(args).is_some())
    }
    fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Default)]
struct Functions(HashMap<FunctionId, Box<dyn EntryTable>>);

/// Memoization table keyed by function identity and argument values.
///
/// The table is shared by every session of an app and may be used from several threads.
/// Computations run outside the table's lock; when two callers race on the same key,
/// the entry inserted first wins and both callers receive it.
///
/// There is no eviction: entries live until they are cleared.
#[derive(Default)]
pub struct CacheTable {
    data: Mutex<Functions>,
    resource: Mutex<Functions>,
}

impl CacheTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, mode: CacheMode) -> MutexGuard<'_, Functions> {
        let table = match mode {
            CacheMode::Data => &self.data,
            CacheMode::Resource => &self.resource,
        };
        table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup<A, T>(
        &self,
        mode: CacheMode,
        function: &FunctionId,
        args: &A,
    ) -> Result<Option<Arc<T>>, FunctionId>
    where
        A: Hash + Eq + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let table = self.table(mode);
        let Some(entries) = table.0.get(function) else {
            return Ok(None);
        };
        match entries.as_any().downcast_ref::<Entries<A, T>>() {
            Some(entries) => Ok(entries.0.get(args).cloned()),
            None => Err(function.clone()),
        }
    }

    fn shared<A, T, E>(
        &self,
        mode: CacheMode,
        function: &FunctionId,
        args: &A,
        f: impl FnOnce(&A) -> Result<T, E>,
    ) -> Result<Arc<T>, CacheError<E>>
    where
        A: Hash + Eq + Clone + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        match self.lookup::<A, T>(mode, function, args) {
            Ok(Some(value)) => {
                tracing::trace!(%function, %mode, "cache hit");
                return Ok(value);
            }
            Ok(None) => {}
            Err(function) => return Err(CacheError::TypeMismatch { function }),
        }
        tracing::debug!(%function, %mode, "cache miss");
        let value = Arc::new(f(args).map_err(CacheError::Compute)?);

        let mut table = self.table(mode);
        let entries = table
            .0
            .entry(function.clone())
            .or_insert_with(|| Box::new(Entries::<A, T>(HashMap::new())));
        let Some(entries) = entries.as_any_mut().downcast_mut::<Entries<A, T>>() else {
            return Err(CacheError::TypeMismatch {
                function: function.clone(),
            });
        };
        Ok(entries.0.entry(args.clone()).or_insert(value).clone())
    }

    /// Returns the cached result for `(function, args)`, computing and storing it on first use.
    ///
    /// If `f` fails, nothing is stored and the error is returned.
    /// `T: Clone` is only used in data mode; use [`CacheTable::resource`] for values that cannot be cloned.
    pub fn get_or_compute<A, T, E>(
        &self,
        function: &FunctionId,
        args: &A,
        mode: CacheMode,
        f: impl FnOnce(&A) -> Result<T, E>,
    ) -> Result<Cached<T>, CacheError<E>>
    where
        A: Hash + Eq + Clone + Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        let value = self.shared(mode, function, args, f)?;
        Ok(match mode {
            CacheMode::Data => Cached::Copied(T::clone(&value)),
            CacheMode::Resource => Cached::Shared(value),
        })
    }

    /// Data mode: returns a fresh copy of the cached value on every call.
    pub fn data<A, T, E>(
        &self,
        function: &FunctionId,
        args: &A,
        f: impl FnOnce(&A) -> Result<T, E>,
    ) -> Result<T, CacheError<E>>
    where
        A: Hash + Eq + Clone + Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        let value = self.shared(CacheMode::Data, function, args, f)?;
        Ok(T::clone(&value))
    }

    /// Resource mode: returns the same instance on every call.
    pub fn resource<A, T, E>(
        &self,
        function: &FunctionId,
        args: &A,
        f: impl FnOnce(&A) -> Result<T, E>,
    ) -> Result<Arc<T>, CacheError<E>>
    where
        A: Hash + Eq + Clone + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.shared(CacheMode::Resource, function, args, f)
    }

    /// Removes every entry of `function` in both modes.
    ///
    /// Returns `true` if anything was removed.
    pub fn clear(&self, function: &FunctionId) -> bool {
        let data = self.table(CacheMode::Data).0.remove(function).is_some();
        let resource = self.table(CacheMode::Resource).0.remove(function).is_some();
        data || resource
    }

    /// Removes the single entry for `(function, args)` in both modes.
    ///
    /// Fails with [`CacheError::TypeMismatch`] if `function` was cached with another argument type.
    pub fn clear_entry<A: 'static>(
        &self,
        function: &FunctionId,
        args: &A,
    ) -> Result<bool, CacheError<Infallible>> {
        let mut removed = false;
        for mode in [CacheMode::Data, CacheMode::Resource] {
            if let Some(entries) = self.table(mode).0.get_mut(function) {
                match entries.remove(args) {
                    Some(r) => removed |= r,
                    None => {
                        return Err(CacheError::TypeMismatch {
                            function: function.clone(),
                        })
                    }
                }
            }
        }
        Ok(removed)
    }

    pub fn clear_mode(&self, mode: CacheMode) {
        self.table(mode).0.clear();
    }
    pub fn clear_all(&self) {
        self.clear_mode(CacheMode::Data);
        self.clear_mode(CacheMode::Resource);
    }

    /// Number of entries stored in `mode`.
    pub fn len(&self, mode: CacheMode) -> usize {
        self.table(mode).0.values().map(|e| e.len()).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.len(CacheMode::Data) == 0 && self.len(CacheMode::Resource) == 0
    }
}

impl std::fmt::Debug for CacheTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheTable")
            .field("data", &self.len(CacheMode::Data))
            .field("resource", &self.len(CacheMode::Resource))
            .finish()
    }
}

type ComputeFn<A, T, E> = dyn Fn(&A) -> Result<T, E> + Send + Sync;

/// A function memoized in data mode.
///
/// ```
/// use rerun_session::{CacheTable, CachedData};
///
/// let load = CachedData::new("load_rows", |n: &usize| Ok::<_, std::fmt::Error>(vec![0.0; *n]));
/// let cache = CacheTable::new();
/// let mut a = load.call(&cache, &3).unwrap();
/// let b = load.call(&cache, &3).unwrap();
/// a[0] = 1.0;
/// assert_eq!(b[0], 0.0);
/// ```
#[derive_ex(Clone, bound())]
pub struct CachedData<A, T, E> {
    function: FunctionId,
    f: Arc<ComputeFn<A, T, E>>,
}
impl<A, T, E> CachedData<A, T, E>
where
    A: Hash + Eq + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new(
        function: impl Into<FunctionId>,
        f: impl Fn(&A) -> Result<T, E> + Send + Sync + 'static,
    ) -> Self {
        Self {
            function: function.into(),
            f: Arc::new(f),
        }
    }
    pub fn function(&self) -> &FunctionId {
        &self.function
    }
    pub fn call(&self, cache: &CacheTable, args: &A) -> Result<T, CacheError<E>> {
        cache.data(&self.function, args, |args| (self.f)(args))
    }
    pub fn clear(&self, cache: &CacheTable) -> bool {
        cache.clear(&self.function)
    }
    pub fn clear_entry(
        &self,
        cache: &CacheTable,
        args: &A,
    ) -> Result<bool, CacheError<Infallible>> {
        cache.clear_entry(&self.function, args)
    }
}

/// A function memoized in resource mode.
#[derive_ex(Clone, bound())]
pub struct CachedResource<A, T, E> {
    function: FunctionId,
    f: Arc<ComputeFn<A, T, E>>,
}
impl<A, T, E> CachedResource<A, T, E>
where
    A: Hash + Eq + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    pub fn new(
        function: impl Into<FunctionId>,
        f: impl Fn(&A) -> Result<T, E> + Send + Sync + 'static,
    ) -> Self {
        Self {
            function: function.into(),
            f: Arc::new(f),
        }
    }
    pub fn function(&self) -> &FunctionId {
        &self.function
    }
    pub fn call(&self, cache: &CacheTable, args: &A) -> Result<Arc<T>, CacheError<E>> {
        cache.resource(&self.function, args, |args| (self.f)(args))
    }
    pub fn clear(&self, cache: &CacheTable) -> bool {
        cache.clear(&self.function)
    }
    pub fn clear_entry(
        &self,
        cache: &CacheTable,
        args: &A,
    ) -> Result<bool, CacheError<Infallible>> {
        cache.clear_entry(&self.function, args)
    }
}
