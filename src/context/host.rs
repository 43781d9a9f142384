//! Binding expressions to host data.
//!
//! A host type publishes the members an expression may reach as a [`Members`]
//! table of closures, built once. [`HostContext`] wraps a host value together
//! with that table. Zero-argument names are looked up as a property, then a
//! field, then a zero-argument method; names called with arguments are looked
//! up as a method with exactly that many parameters.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::context::{Context, ResolveError};

type Getter<T> = Box<dyn Fn(&T) -> f64 + Send + Sync>;
type Method<T> = Box<dyn Fn(&T, &[f64]) -> f64 + Send + Sync>;

/// Name to accessor table for a host type `T`.
pub struct Members<T> {
    properties: HashMap<String, Getter<T>>,
    fields: HashMap<String, Getter<T>>,
    /// Overloads keyed by arity.
    methods: HashMap<String, HashMap<usize, Method<T>>>,
}

/// Implemented by host types that publish a fixed member table.
pub trait Expose: Sized {
    fn members() -> Members<Self>;
}

impl<T> Default for Members<T> {
    fn default() -> Self {
        Members {
            properties: HashMap::new(),
            fields: HashMap::new(),
            methods: HashMap::new(),
        }
    }
}

impl<T> Members<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A computed value. Takes precedence over a field of the same name.
    pub fn property<R: Into<f64>>(
        mut self,
        name: impl Into<String>,
        get: impl Fn(&T) -> R + Send + Sync + 'static,
    ) -> Self {
        self.properties.insert(name.into(), getter(get));
        self
    }

    /// A stored value, e.g. `.field("hp", |unit: &Unit| unit.hp)` for any
    /// numeric type that widens to `f64`.
    pub fn field<R: Into<f64>>(
        mut self,
        name: impl Into<String>,
        get: impl Fn(&T) -> R + Send + Sync + 'static,
    ) -> Self {
        self.fields.insert(name.into(), getter(get));
        self
    }

    /// A method taking exactly `arity` arguments. Registering the same name
    /// and arity again replaces the earlier method.
    pub fn method<R: Into<f64>>(
        mut self,
        name: impl Into<String>,
        arity: usize,
        call: impl Fn(&T, &[f64]) -> R + Send + Sync + 'static,
    ) -> Self {
        let call: Method<T> = Box::new(move |host: &T, arguments: &[f64]| -> f64 {
            call(host, arguments).into()
        });
        self.methods.entry(name.into()).or_default().insert(arity, call);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
            || self.fields.contains_key(name)
            || self.methods.contains_key(name)
    }

    fn method_with_arity(&self, name: &str, arity: usize) -> Option<&Method<T>> {
        self.methods.get(name)?.get(&arity)
    }
}

fn getter<T, R: Into<f64>>(get: impl Fn(&T) -> R + Send + Sync + 'static) -> Getter<T> {
    Box::new(move |host: &T| -> f64 { get(host).into() })
}

impl<T> fmt::Debug for Members<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self
            .methods
            .iter()
            .flat_map(|(name, overloads)| overloads.keys().map(move |arity| (name, arity)))
            .collect();
        methods.sort();
        f.debug_struct("Members")
            .field("properties", &self.properties.keys().collect::<Vec<_>>())
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("methods", &methods)
            .finish()
    }
}

/// Resolves names against a host value through its [`Members`] table.
///
/// Thread safety is that of `T`: the accessors only take `&T`.
pub struct HostContext<T> {
    host: T,
    members: Arc<Members<T>>,
}

impl<T: Expose> HostContext<T> {
    pub fn new(host: T) -> Self {
        HostContext {
            host,
            members: Arc::new(T::members()),
        }
    }
}

impl<T> HostContext<T> {
    /// Wraps `host` with an explicit table. Pass an `Arc` to share one table
    /// between many host values.
    pub fn with_members(host: T, members: impl Into<Arc<Members<T>>>) -> Self {
        HostContext {
            host,
            members: members.into(),
        }
    }

    pub fn host(&self) -> &T {
        &self.host
    }

    pub fn members(&self) -> &Arc<Members<T>> {
        &self.members
    }

    pub fn into_inner(self) -> T {
        self.host
    }
}

impl<T: fmt::Debug> fmt::Debug for HostContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostContext")
            .field("host", &self.host)
            .field("members", &self.members)
            .finish()
    }
}

impl<T> Context for HostContext<T> {
    fn resolve(&self, name: &str, arguments: &[f64]) -> Result<f64, ResolveError> {
        let members = &self.members;
        if arguments.is_empty() {
            if let Some(get) = members.properties.get(name) {
                return Ok(get(&self.host));
            }
            if let Some(get) = members.fields.get(name) {
                return Ok(get(&self.host));
            }
        }

        match members.method_with_arity(name, arguments.len()) {
            Some(call) => Ok(call(&self.host, arguments)),
            None if arguments.is_empty() || members.methods.contains_key(name) => {
                Err(ResolveError::unresolved(name, arguments))
            }
            None => Err(ResolveError::UnknownFunction {
                name: name.to_string(),
            }),
        }
    }

    fn is_resolvable(&self, name: &str) -> bool {
        self.members.contains(name)
    }
}
