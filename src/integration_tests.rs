#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::actor_framework::{Entity, FrameworkError};
    use crate::app_system::ShopSystem;
    use crate::auth::{AuthError, AuthGateway, TokenSigner};
    use crate::clients::{DiscountClient, OrderClient, ProductClient};
    use crate::domain::invoice::{random_invoice_codes, InvoiceCodeFn};
    use crate::domain::{
        CartLine, Customer, Discount, DiscountCreate, Order, OrderStatus, Product, ProductCreate,
    };
    use crate::mock_framework::{
        create_mock_client, expect_action, expect_batch, expect_create_unique, expect_get_many, expect_list,
    };
    use crate::order_actor::OrderError;
    use crate::product_actor::{ProductAction, ProductActionResult, ProductError};

    fn customer() -> Customer {
        Customer::new("Ani", "0812", "Jl. Mawar 1")
    }

    fn system() -> ShopSystem {
        ShopSystem::new(32, random_invoice_codes(), 16)
    }

    async fn add_product(system: &ShopSystem, name: &str, category: &str, price: u64, stock: u32) -> String {
        system
            .product_client
            .create_product(ProductCreate::new(name, category, price, stock))
            .await
            .unwrap()
            .id
    }

    async fn stock_of(system: &ShopSystem, id: &str) -> u32 {
        system
            .product_client
            .get_product(id.to_string())
            .await
            .unwrap()
            .unwrap()
            .stock
    }

    async fn dairy_discount(system: &ShopSystem, percent: u8) {
        system
            .discount_client
            .upsert_discount(DiscountCreate {
                category: "Dairy".into(),
                percent,
                active: true,
            })
            .await
            .unwrap();
    }

    /// Yields the given codes in order, repeating the last one forever.
    fn scripted_codes(codes: &[&str]) -> InvoiceCodeFn {
        let codes: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
        let next = AtomicUsize::new(0);
        Arc::new(move || {
            let i = next.fetch_add(1, Ordering::SeqCst).min(codes.len() - 1);
            codes[i].clone()
        })
    }

    #[tokio::test]
    async fn test_checkout_applies_discount_and_decrements_stock() {
        let system = system();
        let milk = add_product(&system, "Milk", "Dairy", 10_000, 5).await;
        dairy_discount(&system, 10).await;

        let receipt = system
            .order_client
            .checkout(customer(), vec![CartLine::new(milk.clone(), 2)])
            .await
            .unwrap();

        assert_eq!(receipt.total, 18_000);
        assert_eq!(stock_of(&system, &milk).await, 3);

        let order = system
            .order_client
            .get_order(receipt.order_id.clone())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.invoice_code, receipt.invoice_code);
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.customer, customer());
        let line = &order.items[0];
        assert_eq!((line.name.as_str(), line.qty), ("Milk", 2));
        assert_eq!((line.list_price, line.final_price), (10_000, 9_000));
        assert_eq!(line.promo_label.as_deref(), Some("10% Dairy"));

        let summed: u64 = order.items.iter().filter_map(|l| l.line_total()).sum();
        assert_eq!(summed, order.total);

        let by_code = system
            .order_client
            .find_by_invoice(&receipt.invoice_code)
            .await
            .unwrap();
        assert_eq!(by_code.map(|o| o.id), Some(receipt.order_id));
    }

    #[tokio::test]
    async fn test_insufficient_stock_mutates_nothing() {
        let system = system();
        let milk = add_product(&system, "Milk", "Dairy", 10_000, 5).await;
        let bread = add_product(&system, "Bread", "Bakery", 15_000, 1).await;

        let err = system
            .order_client
            .checkout(customer(), vec![CartLine::new(milk.clone(), 6)])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            OrderError::InsufficientStock {
                product: "Milk".into(),
                requested: 6,
                available: 5
            }
        );

        let err = system
            .order_client
            .checkout(
                customer(),
                vec![CartLine::new(milk.clone(), 2), CartLine::new(bread.clone(), 3)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InsufficientStock { ref product, .. } if product == "Bread"));

        assert_eq!(stock_of(&system, &milk).await, 5);
        assert_eq!(stock_of(&system, &bread).await, 1);
        assert!(system.order_client.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_product_lines_are_summed() {
        let system = system();
        let milk = add_product(&system, "Milk", "Dairy", 10_000, 5).await;

        let err = system
            .order_client
            .checkout(
                customer(),
                vec![CartLine::new(milk.clone(), 3), CartLine::new(milk.clone(), 3)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InsufficientStock { requested: 6, available: 5, .. }));

        let receipt = system
            .order_client
            .checkout(
                customer(),
                vec![CartLine::new(milk.clone(), 2), CartLine::new(milk.clone(), 2)],
            )
            .await
            .unwrap();
        assert_eq!(receipt.total, 40_000);
        assert_eq!(stock_of(&system, &milk).await, 1);
    }

    #[tokio::test]
    async fn test_validation_order() {
        let system = system();
        let milk = add_product(&system, "Milk", "Dairy", 10_000, 5).await;
        let checkout = |lines: Vec<CartLine>| system.order_client.checkout(customer(), lines);

        assert!(matches!(checkout(vec![]).await, Err(OrderError::InvalidRequest(_))));
        assert_eq!(
            checkout(vec![CartLine::new("product_404", 1)]).await,
            Err(OrderError::ProductNotFound("product_404".into()))
        );
        // Unknown products are reported before bad quantities.
        assert_eq!(
            checkout(vec![CartLine::new(milk.clone(), 0), CartLine::new("product_404", 1)]).await,
            Err(OrderError::ProductNotFound("product_404".into()))
        );
        assert_eq!(
            checkout(vec![CartLine::new(milk.clone(), -2)]).await,
            Err(OrderError::InvalidQuantity(milk.clone()))
        );
        assert!(matches!(
            checkout(vec![CartLine::new(milk.clone(), i64::MAX)]).await,
            Err(OrderError::InsufficientStock { .. })
        ));
        assert_eq!(stock_of(&system, &milk).await, 5);
    }

    #[tokio::test]
    async fn test_concurrent_checkouts_never_oversell() {
        let system = system();
        let milk = add_product(&system, "Milk", "Dairy", 10_000, 5).await;

        let first = system.order_client.clone();
        let second = system.order_client.clone();
        let (a, b) = tokio::join!(
            first.checkout(customer(), vec![CartLine::new(milk.clone(), 3)]),
            second.checkout(customer(), vec![CartLine::new(milk.clone(), 3)]),
        );
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(stock_of(&system, &milk).await, 2);

        // Many buyers racing for the last units
        let bread = add_product(&system, "Bread", "Bakery", 15_000, 10).await;
        let mut tasks = Vec::new();
        for _ in 0..25 {
            let client = system.order_client.clone();
            let line = CartLine::new(bread.clone(), 1);
            tasks.push(tokio::spawn(async move { client.checkout(customer(), vec![line]).await }));
        }
        let mut sold = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => sold += 1,
                Err(e) => assert!(matches!(e, OrderError::InsufficientStock { .. }), "{:?}", e),
            }
        }
        assert_eq!(sold, 10);
        assert_eq!(stock_of(&system, &bread).await, 0);
    }

    #[tokio::test]
    async fn test_invoice_codes_are_distinct() {
        let system = system();
        let milk = add_product(&system, "Milk", "Dairy", 1_000, 100).await;

        let mut codes = HashSet::new();
        for _ in 0..30 {
            let receipt = system
                .order_client
                .checkout(customer(), vec![CartLine::new(milk.clone(), 1)])
                .await
                .unwrap();
            codes.insert(receipt.invoice_code);
        }
        assert_eq!(codes.len(), 30);
    }

    #[tokio::test]
    async fn test_invoice_collision_draws_a_new_code() {
        let codes = scripted_codes(&["INV-20240101-111111", "INV-20240101-111111", "INV-20240101-222222"]);
        let system = ShopSystem::new(32, codes, 4);
        let milk = add_product(&system, "Milk", "Dairy", 1_000, 10).await;

        let first = system
            .order_client
            .checkout(customer(), vec![CartLine::new(milk.clone(), 1)])
            .await
            .unwrap();
        let second = system
            .order_client
            .checkout(customer(), vec![CartLine::new(milk.clone(), 1)])
            .await
            .unwrap();
        assert_eq!(first.invoice_code, "INV-20240101-111111");
        assert_eq!(second.invoice_code, "INV-20240101-222222");
    }

    #[tokio::test]
    async fn test_invoice_exhaustion_restocks() {
        let codes = scripted_codes(&["INV-20240101-111111"]);
        let system = ShopSystem::new(32, codes, 3);
        let milk = add_product(&system, "Milk", "Dairy", 1_000, 5).await;

        system
            .order_client
            .checkout(customer(), vec![CartLine::new(milk.clone(), 1)])
            .await
            .unwrap();
        let err = system
            .order_client
            .checkout(customer(), vec![CartLine::new(milk.clone(), 2)])
            .await
            .unwrap_err();

        assert_eq!(err, OrderError::InvoiceExhausted(3));
        assert_eq!(stock_of(&system, &milk).await, 4);
        assert_eq!(system.order_client.list_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_order_status_and_deletion() {
        let system = system();
        let milk = add_product(&system, "Milk", "Dairy", 1_000, 5).await;
        let receipt = system
            .order_client
            .checkout(customer(), vec![CartLine::new(milk, 1)])
            .await
            .unwrap();

        let shipped = system
            .order_client
            .set_status(receipt.order_id.clone(), OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);
        assert_eq!(shipped.total, receipt.total);

        assert_eq!(
            system
                .order_client
                .set_status("order_404".into(), OrderStatus::Shipped)
                .await,
            Err(OrderError::NotFound("order_404".into()))
        );

        system.order_client.delete_order(receipt.order_id.clone()).await.unwrap();
        assert_eq!(system.order_client.get_order(receipt.order_id).await, Ok(None));
    }

    #[tokio::test]
    async fn test_auth_gateway() {
        let system = system();
        let auth = AuthGateway::new(
            system.admin_client.clone(),
            TokenSigner::new("secret", chrono::Duration::hours(1)),
        );

        assert!(matches!(
            auth.bootstrap_admin("  ", "pw").await,
            Err(AuthError::InvalidRequest(_))
        ));
        auth.bootstrap_admin("root", "pw").await.unwrap();
        assert_eq!(
            auth.bootstrap_admin("root", "other").await,
            Err(AuthError::InvalidRequest("Admin already exists".into()))
        );

        assert_eq!(auth.login("root", "nope").await, Err(AuthError::InvalidCredentials));
        assert_eq!(auth.login("ghost", "pw").await, Err(AuthError::InvalidCredentials));

        let session = auth.login("root", "pw").await.unwrap();
        let claims = auth.verify(&session.token).unwrap();
        assert_eq!(claims.username, "root");
        assert!(claims.sub.starts_with("admin_"));
    }

    fn milk_product(stock: u32) -> Product {
        Product::from_create_params("product_1".into(), ProductCreate::new("Milk", "Dairy", 10_000, stock)).unwrap()
    }

    fn dairy(percent: u8) -> Discount {
        Discount::from_create_params(
            "discount_1".into(),
            DiscountCreate {
                category: "Dairy".into(),
                percent,
                active: true,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_checkout_flow_with_mocks() {
        // 1. Setup Mocks
        let (product_inner, mut product_rx) = create_mock_client::<Product>(10);
        let (discount_inner, mut discount_rx) = create_mock_client::<Discount>(10);
        let (order_inner, mut order_rx) = create_mock_client::<Order>(10);
        let order_client = OrderClient::new(
            order_inner,
            ProductClient::new(product_inner),
            DiscountClient::new(discount_inner),
            scripted_codes(&["INV-20240101-123456"]),
            4,
        );

        // 2. Execute checkout in background
        let task = tokio::spawn(async move {
            order_client
                .checkout(customer(), vec![CartLine::new("product_1", 2)])
                .await
        });

        // 3. Verify Interactions

        // Expect one batched product lookup
        let (ids, responder) = expect_get_many(&mut product_rx).await.expect("Expected GetMany");
        assert_eq!(ids, vec!["product_1".to_string()]);
        responder.send(Ok(vec![milk_product(5)])).unwrap();

        // Expect the active discounts, filtered inside the actor
        let (filter, responder) = expect_list(&mut discount_rx).await.expect("Expected List");
        let filter = filter.expect("Expected a filter");
        let mut inactive = dairy(50);
        inactive.active = false;
        assert!(filter(&dairy(10)));
        assert!(!filter(&inactive));
        responder.send(Ok(vec![dairy(10)])).unwrap();

        // Expect the reservation batch
        let (actions, responder) = expect_batch(&mut product_rx).await.expect("Expected Batch");
        assert_eq!(actions, vec![("product_1".to_string(), ProductAction::ReserveStock(2))]);
        responder.send(Ok(vec![ProductActionResult::ReserveStock(3)])).unwrap();

        // Expect the unique insert
        let (params, conflicts, responder) =
            expect_create_unique(&mut order_rx).await.expect("Expected CreateUnique");
        assert_eq!(params.invoice_code, "INV-20240101-123456");
        assert_eq!(params.total, 18_000);
        assert_eq!(params.items[0].final_price, 9_000);
        let order = Order::from_create_params("order_1".into(), params).unwrap();
        assert!(conflicts(&order));
        responder.send(Ok(order)).unwrap();

        // 4. Verify Result
        let receipt = task.await.unwrap().unwrap();
        assert_eq!(receipt.order_id, "order_1");
        assert_eq!(receipt.total, 18_000);
    }

    #[tokio::test]
    async fn test_failed_order_save_restocks() {
        let (product_inner, mut product_rx) = create_mock_client::<Product>(10);
        let (discount_inner, mut discount_rx) = create_mock_client::<Discount>(10);
        let (order_inner, mut order_rx) = create_mock_client::<Order>(10);
        let order_client = OrderClient::new(
            order_inner,
            ProductClient::new(product_inner),
            DiscountClient::new(discount_inner),
            scripted_codes(&["INV-20240101-123456"]),
            4,
        );

        let task = tokio::spawn(async move {
            order_client
                .checkout(customer(), vec![CartLine::new("product_1", 2)])
                .await
        });

        let (_, responder) = expect_get_many(&mut product_rx).await.expect("Expected GetMany");
        responder.send(Ok(vec![milk_product(5)])).unwrap();
        let (_, responder) = expect_list(&mut discount_rx).await.expect("Expected List");
        responder.send(Ok(vec![])).unwrap();
        let (_, responder) = expect_batch(&mut product_rx).await.expect("Expected Batch");
        responder.send(Ok(vec![ProductActionResult::ReserveStock(3)])).unwrap();

        // The order store fails
        let (params, _, responder) =
            expect_create_unique(&mut order_rx).await.expect("Expected CreateUnique");
        assert_eq!(params.total, 20_000);
        responder
            .send(Err(FrameworkError::Entity(OrderError::DatabaseError("disk full".into()))))
            .unwrap();

        // Expect the compensating restock
        let (id, action, responder) = expect_action(&mut product_rx).await.expect("Expected restock Action");
        assert_eq!((id.as_str(), action), ("product_1", ProductAction::Restock(2)));
        responder.send(Ok(ProductActionResult::Restock(5))).unwrap();

        assert_eq!(
            task.await.unwrap(),
            Err(OrderError::DatabaseError("disk full".into()))
        );
    }

    #[tokio::test]
    async fn test_restock_skips_deleted_products() {
        let system = system();
        let milk = add_product(&system, "Milk", "Dairy", 10_000, 5).await;
        let bread = add_product(&system, "Bread", "Bakery", 15_000, 5).await;
        let lines = vec![(milk.clone(), 2), (bread.clone(), 2)];

        system.product_client.reserve_batch(lines.clone()).await.unwrap();
        system.product_client.delete_product(bread).await.unwrap();

        let failed = system.product_client.restock_lines(lines).await;
        assert!(failed.is_empty(), "{:?}", failed);
        assert_eq!(stock_of(&system, &milk).await, 5);
    }

    #[tokio::test]
    async fn test_lost_race_reports_summed_quantity() {
        let (product_inner, mut product_rx) = create_mock_client::<Product>(10);
        let (discount_inner, mut discount_rx) = create_mock_client::<Discount>(10);
        let (order_inner, _order_rx) = create_mock_client::<Order>(10);
        let order_client = OrderClient::new(
            order_inner,
            ProductClient::new(product_inner),
            DiscountClient::new(discount_inner),
            scripted_codes(&["INV-20240101-123456"]),
            4,
        );

        let task = tokio::spawn(async move {
            order_client
                .checkout(
                    customer(),
                    vec![CartLine::new("product_1", 2), CartLine::new("product_1", 2)],
                )
                .await
        });

        let (_, responder) = expect_get_many(&mut product_rx).await.expect("Expected GetMany");
        responder.send(Ok(vec![milk_product(5)])).unwrap();
        let (_, responder) = expect_list(&mut discount_rx).await.expect("Expected List");
        responder.send(Ok(vec![])).unwrap();

        // Another buyer took most of the stock in between
        let (actions, responder) = expect_batch(&mut product_rx).await.expect("Expected Batch");
        assert_eq!(actions, vec![("product_1".to_string(), ProductAction::ReserveStock(4))]);
        responder
            .send(Err(FrameworkError::Entity(ProductError::InsufficientStock {
                product: "Milk".into(),
                requested: 4,
                available: 1,
            })))
            .unwrap();

        assert_eq!(
            task.await.unwrap(),
            Err(OrderError::InsufficientStock {
                product: "Milk".into(),
                requested: 4,
                available: 1
            })
        );
    }
}
