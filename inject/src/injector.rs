//! Member injection into existing objects.

use crate::component::{Injectable, InjectionPoints};
use crate::container::Container;
use crate::core::TypeKey;
use crate::error::{Error, Result};
use tracing::trace;

impl Container {
  /// Resolves every injection point of `target` and assigns the results,
  /// returning the same object.
  ///
  /// Members are filled in declaration order. If any member cannot be
  /// resolved the object is dropped and the error names the member.
  ///
  /// ```
  /// use fibre_inject::{Container, Injectable, InjectionPoints};
  /// use std::sync::Arc;
  ///
  /// #[derive(Default)]
  /// struct Banner {
  ///   text: Option<Arc<String>>,
  ///   width: usize,
  /// }
  ///
  /// impl Injectable for Banner {
  ///   fn injection_points(points: &mut InjectionPoints<Self>) {
  ///     points.member::<String>("text", |banner, text| banner.text = Some(text));
  ///   }
  /// }
  ///
  /// let container = Container::new();
  /// container.register_instance(Arc::new("hello".to_string()));
  ///
  /// let banner = container.inject_dependencies_into(Banner::default()).unwrap();
  /// assert_eq!(banner.text.as_deref().map(String::as_str), Some("hello"));
  /// assert_eq!(banner.width, 0);
  /// ```
  pub fn inject_dependencies_into<T: Injectable>(&self, target: T) -> Result<T> {
    self.ensure_live()?;
    self.inject_into(target)
  }

  pub(crate) fn inject_into<T: Injectable>(&self, mut target: T) -> Result<T> {
    let target_key = TypeKey::of::<T>();
    for point in InjectionPoints::<T>::collect().iter() {
      let failed = |source: Error| Error::Injection {
        target: target_key.name(),
        member: point.member(),
        source: Box::new(source),
      };
      let instance = self.resolve_for(target_key, point.contract()).map_err(failed)?;
      point.assign(&mut target, instance).map_err(failed)?;
      trace!(target = %target_key, member = point.member(), "injected member");
    }
    Ok(target)
  }

  /// Checks, without resolving anything, that every injection point of `T` could be filled.
  pub(crate) fn probe_members<T: Injectable>(&self, visiting: &mut Vec<TypeKey>) -> Result<()> {
    let target_key = TypeKey::of::<T>();
    for point in InjectionPoints::<T>::collect().iter() {
      self
        .probe(point.contract(), visiting)
        .map_err(|source| Error::Injection {
          target: target_key.name(),
          member: point.member(),
          source: Box::new(source),
        })?;
    }
    Ok(())
  }
}
