//! Demonstration of ObservableStore with a typed user state

use statecast::{Keyed, Observable, ObservableStore, Observer, State, StoreError};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct UserState {
    user: String,
    is_authenticated: bool,
}

#[derive(Default)]
struct UserPatch {
    user: Option<String>,
    is_authenticated: Option<bool>,
}

impl State for UserState {
    type Patch = UserPatch;

    fn merge(&self, patch: &UserPatch) -> Self {
        Self {
            user: patch.user.clone().unwrap_or_else(|| self.user.clone()),
            is_authenticated: patch.is_authenticated.unwrap_or(self.is_authenticated),
        }
    }
}

impl Keyed for UserState {
    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "user" => Some(self.user.clone().into()),
            "isAuthenticated" => Some(self.is_authenticated.into()),
            _ => None,
        }
    }
}

fn main() -> Result<(), StoreError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Observable Store Example ===\n");

    let store = ObservableStore::new();
    store.setup(UserState {
        user: "Noran".to_string(),
        is_authenticated: false,
    })?;

    println!("1. Watching `user`");
    let user_sub = store.select_state("user")?.subscribe_observer(
        Observer::new(|user: &Option<Value>| println!("   [user] {:?}", user))
            .on_complete(|| println!("   [user] complete")),
    );

    println!("\n2. Watching `isAuthenticated` through a typed projection");
    let auth_sub = store
        .select(|state: &UserState| state.is_authenticated)?
        .subscribe(|auth: &bool| println!("   [auth] {}", auth));

    println!("\n3. Renaming the user (only [user] fires)");
    store.update_state(UserPatch {
        user: Some("Diaconu".to_string()),
        ..Default::default()
    })?;

    println!("\n4. Authenticating (only [auth] fires)");
    store.update_state(UserPatch {
        is_authenticated: Some(true),
        ..Default::default()
    })?;

    println!("\n5. Empty update (nothing fires)");
    store.update_state(UserPatch::default())?;

    println!("\n6. Current snapshot: {:?}", store.snapshot()?);

    println!("\n7. Completing the store");
    store.complete_state()?;
    println!("   user subscription closed: {}", user_sub.is_closed());
    println!("   auth subscription closed: {}", auth_sub.is_closed());

    println!("\n8. Updating after completion");
    match store.update_state(UserPatch::default()) {
        Err(err) => println!("   rejected: {}", err),
        Ok(()) => println!("   accepted"),
    }

    println!("\n✓ Example complete!");
    Ok(())
}
