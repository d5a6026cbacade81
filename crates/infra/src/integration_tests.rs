//! Service-level tests over the in-memory stores.
//!
//! Verifies:
//! - Stock never goes negative and purchases are exact
//! - Concurrent purchases of one record cannot oversell
//! - Deleted records are gone for every operation
//! - Registration, login and refresh behave as the HTTP layer expects

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use sweetshop_auth::{AuthError, AuthService, Hs256Jwt, Registration, Role, TokenType};
    use sweetshop_core::{SweetId, ValidationError};
    use sweetshop_inventory::{InventoryError, InventoryService, MAX_STOCK, SweetFields};

    use crate::{InMemoryInventoryStore, InMemoryUserStore};

    type Service = InventoryService<Arc<InMemoryInventoryStore>>;

    fn service() -> Service {
        InventoryService::new(Arc::new(InMemoryInventoryStore::new()))
    }

    fn fields(name: &str, category: &str, price: &str, qty: i64) -> SweetFields {
        SweetFields::new(name, category, price.parse().unwrap(), qty)
    }

    async fn seed(service: &Service, name: &str, category: &str, qty: i64) -> SweetId {
        service
            .create(&fields(name, category, "2.50", qty))
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids_and_keeps_stock() {
        let svc = service();
        let a = svc.create(&fields("Chocolate Bar", "Chocolate", "1.99", 25)).await.unwrap();
        let b = svc.create(&fields("Gummy Bear", "Gummy", "0.99", 0)).await.unwrap();

        assert!(a.id < b.id);
        assert_eq!(a.quantity_in_stock, 25);
        assert_eq!(b.quantity_in_stock, 0);
        assert_eq!(a.price, Decimal::new(199, 2));
    }

    #[tokio::test]
    async fn invalid_create_persists_nothing() {
        let svc = service();
        let err = svc.create(&fields("Toffee", "Chewy", "1.00", -1)).await.unwrap_err();
        assert_eq!(err, InventoryError::Validation(ValidationError::negative("quantity_in_stock")));

        let err = svc.create(&fields("Toffee", "Chewy", "0", 3)).await.unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));

        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn purchase_decrements_exactly_and_rejects_overdraw() {
        let svc = service();
        let id = seed(&svc, "Lollipop", "Hard Candy", 10).await;

        assert_eq!(svc.purchase(id, 3).await.unwrap().quantity_in_stock, 7);
        assert_eq!(svc.purchase(id, 7).await.unwrap().quantity_in_stock, 0);

        let err = svc.purchase(id, 1).await.unwrap_err();
        assert_eq!(
            err,
            InventoryError::InsufficientStock {
                id,
                available: 0,
                requested: 1
            }
        );
        assert_eq!(svc.get(id).await.unwrap().quantity_in_stock, 0);
    }

    #[tokio::test]
    async fn purchase_checks_quantity_before_existence() {
        let svc = service();
        let missing = SweetId::new(404);

        assert_eq!(
            svc.purchase(missing, 0).await.unwrap_err(),
            InventoryError::Validation(ValidationError::must_be_positive("quantity"))
        );
        assert_eq!(
            svc.purchase(missing, 1).await.unwrap_err(),
            InventoryError::NotFound(missing)
        );
    }

    #[tokio::test]
    async fn oversized_purchase_is_insufficient_stock_not_invalid() {
        let svc = service();
        let id = seed(&svc, "Fudge", "Chewy", 5).await;

        for requested in [MAX_STOCK + 1, i64::MAX] {
            assert_eq!(
                svc.purchase(id, requested).await.unwrap_err(),
                InventoryError::InsufficientStock {
                    id,
                    available: 5,
                    requested
                }
            );
        }
        assert_eq!(svc.get(id).await.unwrap().quantity_in_stock, 5);
    }

    #[tokio::test]
    async fn restock_increments_and_respects_upper_bound() {
        let svc = service();
        let id = seed(&svc, "Fudge", "Chewy", 5).await;

        assert_eq!(svc.restock(id, 20).await.unwrap().quantity_in_stock, 25);

        for bad in [0, -3] {
            assert!(matches!(
                svc.restock(id, bad).await.unwrap_err(),
                InventoryError::Validation(ValidationError::MustBePositive { .. })
            ));
        }

        let err = svc.restock(id, MAX_STOCK).await.unwrap_err();
        assert!(matches!(err, InventoryError::Validation(ValidationError::TooLarge { .. })));
        assert_eq!(svc.get(id).await.unwrap().quantity_in_stock, 25);
    }

    #[tokio::test]
    async fn update_validates_before_looking_up_the_record() {
        let svc = service();
        let missing = SweetId::new(77);

        let err = svc.update(missing, &fields("", "Chewy", "1.00", 1)).await.unwrap_err();
        assert_eq!(err, InventoryError::Validation(ValidationError::required("name")));

        let err = svc.update(missing, &fields("Fudge", "Chewy", "1.00", 1)).await.unwrap_err();
        assert_eq!(err, InventoryError::NotFound(missing));
    }

    #[tokio::test]
    async fn update_replaces_every_field() {
        let svc = service();
        let id = seed(&svc, "Fudge", "Chewy", 5).await;

        let updated = svc
            .update(id, &fields(" Dark Fudge ", "Premium", "4.75", 12))
            .await
            .unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(updated.name, "Dark Fudge");
        assert_eq!(updated.category, "Premium");
        assert_eq!(updated.quantity_in_stock, 12);
        assert_eq!(svc.get(id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn deleted_record_is_not_found_everywhere() {
        let svc = service();
        let id = seed(&svc, "Mint", "Hard Candy", 4).await;

        svc.delete(id).await.unwrap();

        let not_found = InventoryError::NotFound(id);
        assert_eq!(svc.delete(id).await.unwrap_err(), not_found);
        assert_eq!(svc.get(id).await.unwrap_err(), not_found);
        assert_eq!(svc.purchase(id, 1).await.unwrap_err(), not_found);
        assert_eq!(svc.restock(id, 1).await.unwrap_err(), not_found);
        assert_eq!(
            svc.update(id, &fields("Mint", "Hard Candy", "1.00", 1)).await.unwrap_err(),
            not_found
        );
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_matches_name_or_category_in_id_order() {
        let svc = service();
        let bar = seed(&svc, "Chocolate Bar", "Candy", 3).await;
        let bear = seed(&svc, "Gummy Bear", "Chocolate", 3).await;
        let _mint = seed(&svc, "Mint", "Hard Candy", 3).await;

        let ids: Vec<SweetId> = svc.search("choc").await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![bar, bear]);

        let ids: Vec<SweetId> = svc.search("  BEAR ").await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![bear]);

        assert_eq!(svc.search("   ").await.unwrap(), svc.list().await.unwrap());
        assert!(svc.search("liquorice").await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_purchases_never_oversell() {
        let svc = Arc::new(service());
        let id = seed(&svc, "Truffle", "Chocolate", 5).await;

        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move { svc.purchase(id, 3).await })
            })
            .collect();

        let mut succeeded = 0;
        let mut insufficient = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(InventoryError::InsufficientStock { .. }) => insufficient += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!((succeeded, insufficient), (1, 1));
        assert_eq!(svc.get(id).await.unwrap().quantity_in_stock, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn many_single_unit_purchases_drain_exactly() {
        let svc = Arc::new(service());
        let id = seed(&svc, "Jelly Bean", "Gummy", 50).await;

        let tasks: Vec<_> = (0..80)
            .map(|_| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move { svc.purchase(id, 1).await.is_ok() })
            })
            .collect();

        let mut sold = 0;
        for task in tasks {
            if task.await.unwrap() {
                sold += 1;
            }
        }

        assert_eq!(sold, 50);
        assert_eq!(svc.get(id).await.unwrap().quantity_in_stock, 0);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;
        use proptest::test_runner::TestCaseError;

        fn runtime() -> tokio::runtime::Runtime {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap()
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            /// Property: a purchase sequence succeeds exactly while it fits the
            /// remaining stock, and failed purchases leave stock unchanged.
            #[test]
            fn purchase_sequences_track_stock_exactly(
                initial in 0i64..200,
                requests in proptest::collection::vec(1i64..40, 0..20),
            ) {
                runtime().block_on(async {
                    let svc = service();
                    let id = seed(&svc, "Nougat", "Chewy", initial).await;
                    let mut expected = initial;

                    for q in requests {
                        match svc.purchase(id, q).await {
                            Ok(record) => {
                                prop_assert!(q <= expected);
                                expected -= q;
                                prop_assert_eq!(record.quantity_in_stock, expected);
                            }
                            Err(InventoryError::InsufficientStock { available, .. }) => {
                                prop_assert!(q > expected);
                                prop_assert_eq!(available, expected);
                            }
                            Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
                        }
                        prop_assert!(expected >= 0);
                    }

                    prop_assert_eq!(svc.get(id).await.unwrap().quantity_in_stock, expected);
                    Ok::<(), TestCaseError>(())
                })?;
            }

            /// Property: restock adds exactly the requested quantity.
            #[test]
            fn restock_adds_exactly(initial in 0i64..1_000, q in 1i64..1_000) {
                runtime().block_on(async {
                    let svc = service();
                    let id = seed(&svc, "Caramel", "Chewy", initial).await;
                    let record = svc.restock(id, q).await.unwrap();
                    prop_assert_eq!(record.quantity_in_stock, initial + q);
                    Ok::<(), TestCaseError>(())
                })?;
            }
        }
    }

    // ── accounts ────────────────────────────────────────────────────────────

    fn auth() -> AuthService<Arc<InMemoryUserStore>> {
        AuthService::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(Hs256Jwt::new(b"integration-secret", 3600, 86_400)),
        )
    }

    fn registration(username: &str, password: &str, confirm: &str) -> Registration {
        Registration {
            username: username.into(),
            email: format!("{username}@example.com"),
            password: password.into(),
            password_confirm: confirm.into(),
        }
    }

    #[tokio::test]
    async fn register_then_login_issues_tokens_for_a_user_role() {
        let auth = auth();
        let session = auth
            .register(&registration("testuser", "testpassword123", "testpassword123"))
            .await
            .unwrap();
        assert_eq!(session.user.role, Role::User);
        assert_ne!(session.user.password_hash, "testpassword123");

        let login = auth.login("testuser", "testpassword123").await.unwrap();
        assert_eq!(login.user.id, session.user.id);

        let claims = auth
            .jwt()
            .decode(&login.tokens.access_token, TokenType::Access, chrono::Utc::now())
            .unwrap();
        assert_eq!(claims.sub, session.user.id);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let auth = auth();
        let form = registration("testuser", "testpassword123", "testpassword123");
        auth.register(&form).await.unwrap();

        assert_eq!(
            auth.register(&form).await.unwrap_err(),
            AuthError::UsernameTaken("testuser".into())
        );
    }

    #[tokio::test]
    async fn weak_or_mismatched_passwords_are_rejected() {
        let auth = auth();
        for (password, confirm) in [
            ("short", "short"),
            ("1234567890", "1234567890"),
            ("testpassword123", "testpassword124"),
        ] {
            let err = auth
                .register(&registration("someone", password, confirm))
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::Validation(_)), "{password}/{confirm}");
        }
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_fail_identically() {
        let auth = auth();
        auth.register(&registration("testuser", "testpassword123", "testpassword123"))
            .await
            .unwrap();

        assert_eq!(
            auth.login("testuser", "wrongpassword").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            auth.login("nobody", "testpassword123").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn refresh_accepts_only_refresh_tokens() {
        let auth = auth();
        let session = auth
            .register(&registration("testuser", "testpassword123", "testpassword123"))
            .await
            .unwrap();

        let pair = auth.refresh(&session.tokens.refresh_token).await.unwrap();
        assert!(!pair.access_token.is_empty());

        assert!(matches!(
            auth.refresh(&session.tokens.access_token).await.unwrap_err(),
            AuthError::InvalidToken(_)
        ));
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let auth = auth();
        let first = auth
            .ensure_admin("admin", "admin@example.com", "adminpass123")
            .await
            .unwrap();
        let second = auth
            .ensure_admin("admin", "admin@example.com", "adminpass123")
            .await
            .unwrap();

        assert_eq!(first.role, Role::Admin);
        assert_eq!(first.id, second.id);
    }
}
