use thiserror::Error;

/// The error type for container configuration, resolution and injection.
#[derive(Debug, Error)]
pub enum Error {
  /// No rule is registered for the contract and it cannot be constructed by convention.
  #[error("cannot resolve contract `{contract}`{}: it is not registered and cannot be constructed by convention", consumer_suffix(.consumer))]
  Unresolvable {
    contract: &'static str,
    consumer: Option<&'static str>,
  },

  #[error("cannot construct `{component}`: constructor `{constructor}` cannot be satisfied, parameter `{parameter}` failed: {source}")]
  NoSatisfiableConstructor {
    component: &'static str,
    constructor: &'static str,
    parameter: &'static str,
    #[source]
    source: Box<Error>,
  },

  #[error("cannot construct `{component}`: it declares no constructors")]
  NoConstructors { component: &'static str },

  #[error("`{implementation}` is not assignable to contract `{contract}`")]
  NotAssignable {
    contract: &'static str,
    implementation: &'static str,
  },

  #[error("failed to inject member `{member}` of `{target}`: {source}")]
  Injection {
    target: &'static str,
    member: &'static str,
    #[source]
    source: Box<Error>,
  },

  #[error("circular dependency detected: {chain}")]
  CircularDependency { chain: String },

  #[error("resolution of `{contract}` exceeded the maximum depth of {max_depth}")]
  DepthExceeded {
    contract: &'static str,
    max_depth: usize,
  },

  #[error("expected an instance of `{expected}` but got `{actual}`")]
  TypeMismatch {
    expected: &'static str,
    actual: &'static str,
  },

  #[error("custom resolver for `{contract}` failed: {message}")]
  Resolver {
    contract: &'static str,
    message: String,
  },

  #[error("the container has been disposed")]
  Disposed,

  #[error("Failed to read container configuration: {0}")]
  ConfigRead(#[from] std::io::Error),

  #[error("Failed to parse container configuration: {0}")]
  ConfigParse(#[from] serde_yaml::Error),
}

impl Error {
  /// Builds the error a custom resolver returns when it cannot produce `C`.
  pub fn resolver<C: ?Sized + 'static>(message: impl Into<String>) -> Self {
    Error::Resolver {
      contract: std::any::type_name::<C>(),
      message: message.into(),
    }
  }

  /// Returns `true` for "not registered / not constructible" failures, looking
  /// through constructor and injection wrappers.
  pub fn is_unresolvable(&self) -> bool {
    match self {
      Error::Unresolvable { .. } | Error::NoConstructors { .. } => true,
      Error::NoSatisfiableConstructor { source, .. } | Error::Injection { source, .. } => {
        source.is_unresolvable()
      }
      _ => false,
    }
  }
}

fn consumer_suffix(consumer: &Option<&'static str>) -> String {
  match consumer {
    Some(consumer) => format!(" required by `{}`", consumer),
    None => String::new(),
  }
}

/// A specialized `Result` type for container operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
