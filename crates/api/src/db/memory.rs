//! In-process document store.
//!
//! Keeps users and products in ordered maps behind a single async lock.
//! Identifiers are assigned sequentially starting from 1, so the HTTP surface
//! behaves the same as against `PostgreSQL`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use bakeapi_core::{Email, Price, ProductId, ProductStatus, UserId};

use super::{ProductStore, RepositoryError, UserStore};
use crate::models::{NewProduct, Product, ProductChanges, User};

#[derive(Debug, Clone)]
struct UserDocument {
    user: User,
    password_hash: String,
}

#[derive(Debug, Default)]
struct Collections {
    users: BTreeMap<UserId, UserDocument>,
    products: BTreeMap<ProductId, Product>,
    last_user_id: i32,
    last_product_id: i32,
}

/// Users and products held in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every product and user and reset identifiers.
    pub async fn clear(&self) {
        *self.collections.write().await = Collections::default();
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let collections = self.collections.read().await;
        Ok(collections
            .users
            .values()
            .find(|doc| &doc.user.email == email)
            .map(|doc| (doc.user.clone(), doc.password_hash.clone())))
    }

    async fn create_user(
        &self,
        email: &Email,
        password_hash: &str,
        bakery_name: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let mut collections = self.collections.write().await;
        if collections.users.values().any(|doc| &doc.user.email == email) {
            return Err(RepositoryError::Conflict(format!(
                "email {email} already exists"
            )));
        }

        collections.last_user_id += 1;
        let user = User {
            id: UserId::new(collections.last_user_id),
            email: email.clone(),
            bakery_name: bakery_name.map(str::to_owned),
        };
        collections.users.insert(
            user.id,
            UserDocument {
                user: user.clone(),
                password_hash: password_hash.to_owned(),
            },
        );

        Ok(user)
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let collections = self.collections.read().await;
        Ok(collections.products.values().cloned().collect())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let collections = self.collections.read().await;
        Ok(collections.products.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Product>, RepositoryError> {
        let collections = self.collections.read().await;
        if !collections.users.contains_key(&owner) {
            return Err(RepositoryError::OwnerNotFound(owner));
        }

        Ok(collections
            .products
            .values()
            .filter(|p| p.user_id == owner)
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        owner: UserId,
        product: &NewProduct,
        created_at: DateTime<Utc>,
    ) -> Result<Product, RepositoryError> {
        let mut collections = self.collections.write().await;
        if !collections.users.contains_key(&owner) {
            return Err(RepositoryError::OwnerNotFound(owner));
        }

        collections.last_product_id += 1;
        let product = Product {
            id: ProductId::new(collections.last_product_id),
            name: product.name.clone(),
            price: product.price,
            status: product.status,
            user_id: owner,
            created_at,
            updated_at: created_at,
        };
        collections.products.insert(product.id, product.clone());

        Ok(product)
    }

    async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut collections = self.collections.write().await;
        Ok(collections.products.get_mut(&id).map(|product| {
            changes.apply(product, Utc::now());
            product.clone()
        }))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut collections = self.collections.write().await;
        Ok(collections.products.remove(&id).is_some())
    }

    async fn list_discount_eligible(
        &self,
        owner: UserId,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let collections = self.collections.read().await;
        Ok(collections
            .products
            .values()
            .filter(|p| p.is_discount_eligible(owner, cutoff))
            .cloned()
            .collect())
    }

    async fn mark_unsold(&self, id: ProductId, price: Price) -> Result<bool, RepositoryError> {
        let mut collections = self.collections.write().await;
        match collections.products.get_mut(&id) {
            Some(product) if product.status == ProductStatus::OnSale => {
                product.price = price;
                product.status = ProductStatus::Unsold;
                product.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use rust_decimal::Decimal;

    use super::*;

    fn price(cents: i64) -> Price {
        Price::new(Decimal::new(cents, 2)).unwrap()
    }

    fn croissant() -> NewProduct {
        NewProduct::new(Some("Croissant".to_owned()), Some(price(120)), None).unwrap()
    }

    async fn store_with_user() -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let email = Email::parse("baker@example.com").unwrap();
        let user = store
            .create_user(&email, "hash", Some("Chez Paul"))
            .await
            .unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let (store, user) = store_with_user().await;
        assert_eq!(user.id, UserId::new(1));

        let first = store.create(user.id, &croissant()).await.unwrap();
        let second = store.create(user.id, &croissant()).await.unwrap();
        assert_eq!(first.id, ProductId::new(1));
        assert_eq!(second.id, ProductId::new(2));
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (store, user) = store_with_user().await;
        let result = store.create_user(&user.email, "other", None).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unknown_owner() {
        let store = MemoryStore::new();
        let missing = UserId::new(42);

        let result = store.create(missing, &croissant()).await;
        assert!(matches!(result, Err(RepositoryError::OwnerNotFound(id)) if id == missing));

        let result = store.list_by_owner(missing).await;
        assert!(matches!(result, Err(RepositoryError::OwnerNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (store, user) = store_with_user().await;
        let product = store.create(user.id, &croissant()).await.unwrap();

        let changes = ProductChanges::new(Some("Pain au chocolat".to_owned()), None, None).unwrap();
        let updated = store.update(product.id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.name, "Pain au chocolat");
        assert_eq!(updated.price, product.price);
        assert_eq!(updated.user_id, user.id);

        assert!(store.delete(product.id).await.unwrap());
        assert!(!store.delete(product.id).await.unwrap());
        assert!(store.update(product.id, &changes).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_unsold_only_once() {
        let (store, user) = store_with_user().await;
        let old = Utc::now() - Duration::hours(5);
        let product = store.insert(user.id, &croissant(), old).await.unwrap();

        let cutoff = Utc::now() - Duration::hours(4);
        let eligible = store.list_discount_eligible(user.id, cutoff).await.unwrap();
        assert_eq!(eligible.len(), 1);

        assert!(store.mark_unsold(product.id, price(90)).await.unwrap());
        assert!(!store.mark_unsold(product.id, price(60)).await.unwrap());

        let stored = store.get(product.id).await.unwrap().unwrap();
        assert_eq!(stored.price, price(90));
        assert_eq!(stored.status, ProductStatus::Unsold);
        assert!(store.list_discount_eligible(user.id, cutoff).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_resets_ids() {
        let (store, user) = store_with_user().await;
        store.create(user.id, &croissant()).await.unwrap();
        store.clear().await;

        assert!(store.list().await.unwrap().is_empty());
        let again = store.create_user(&user.email, "hash", None).await.unwrap();
        assert_eq!(again.id, UserId::new(1));
    }
}
