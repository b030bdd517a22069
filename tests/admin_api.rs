//! Admin back-office API: authentication guard, catalog CRUD, order mutator,
//! statistics.

mod common;

use common::*;
use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_login_and_me() {
    let state = test_state().await;

    let (status, _) = send(
        app(&state),
        post_json(
            "/api/auth/login",
            &json!({ "email": ADMIN_EMAIL, "password": "incorrecta" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = admin_token(&state).await;
    let (status, body) = send(app(&state), get_with_token("/api/auth/me", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], ADMIN_EMAIL);
    assert_eq!(body["role"], "ADMIN");
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let state = test_state().await;
    seed_catalog(&state.pool).await;

    for uri in ["/api/admin/pedidos", "/api/admin/estadisticas"] {
        let (status, body) = send(app(&state), get(uri)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} without token");
        assert_eq!(body["error"], "No autorizado");
    }

    // Mutating catalog routes are guarded too
    let (status, _) = send(
        app(&state),
        post_json("/api/productos", &json!({ "nombre": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A token with a garbage signature is rejected
    let (status, _) = send(
        app(&state),
        get_with_token("/api/admin/pedidos", "not-a-real-token"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_product_crud_with_validation() {
    let state = test_state().await;
    let (categoria_id, _, _) = seed_catalog(&state.pool).await;
    let token = admin_token(&state).await;

    // Field-level validation failure: nombre too short, precio negative
    let (status, body) = send(
        app(&state),
        post_json_with_token(
            "/api/productos",
            &json!({
                "nombre": "ab",
                "descripcionCorta": "Pantalón de lino con corte recto",
                "precio": -1,
                "categoriaId": categoria_id,
                "sku": "SKU-100",
                "stock": 3
            }),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].is_object());

    let (status, created) = send(
        app(&state),
        post_json_with_token(
            "/api/productos",
            &json!({
                "nombre": "Pantalón Lino",
                "descripcionCorta": "Pantalón de lino con corte recto",
                "precio": 89990,
                "categoriaId": categoria_id,
                "sku": "SKU-100",
                "stock": 3,
                "variantes": [
                    { "talla": "32", "color": "Beige", "stock": 3, "sku": "SKU-100-32-B" }
                ]
            }),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
    assert!(created["slug"].as_str().unwrap().starts_with("pantalon-lino-"));
    assert_eq!(created["variantes"][0]["color"], "Beige");
    let producto_id = created["id"].as_str().unwrap().to_string();

    // Duplicate SKU is a conflict, surfaced as 400
    let (status, body) = send(
        app(&state),
        post_json_with_token(
            "/api/productos",
            &json!({
                "nombre": "Pantalón Copia",
                "descripcionCorta": "Otro pantalón con el mismo SKU",
                "precio": 79990,
                "categoriaId": categoria_id,
                "sku": "SKU-100",
                "stock": 1
            }),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "El SKU ya está en uso");

    // Partial update
    let (status, updated) = send(
        app(&state),
        put_json_with_token(
            &format!("/api/productos/{producto_id}"),
            &json!({ "precio": 84990, "activo": false }),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["precio"], 84990);
    assert_eq!(updated["activo"], false);

    // Delete works while no order references the product
    let (status, _) = send(
        app(&state),
        delete_with_token(&format!("/api/productos/{producto_id}"), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_category_delete_guard() {
    let state = test_state().await;
    let (categoria_id, _, _) = seed_catalog(&state.pool).await;
    let token = admin_token(&state).await;

    let (status, body) = send(
        app(&state),
        delete_with_token(&format!("/api/categorias/{categoria_id}"), &token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("tiene productos asociados"));

    // Category unchanged, still served with its product count
    let (status, detail) = send(
        app(&state),
        get_with_token(&format!("/api/categorias/{categoria_id}"), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["nombre"], "Camisetas");
    assert_eq!(detail["productosCount"], 1);
}

async fn checkout_order(state: &modastyle_server::ServerState, producto_id: &str) -> String {
    let (status, body) = send(
        app(state),
        post_json(
            "/api/pagos/crear-sesion",
            &json!({
                "items": [{ "id": producto_id, "cantidad": 1 }],
                "customer": { "email": "ana@example.com", "name": "Ana Gómez" },
                "shippingAddress": { "ciudad": "Bogotá" }
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "checkout failed: {body}");
    body["pedidoId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_order_list_and_detail() {
    let state = test_state().await;
    let (_, producto_id, _) = seed_catalog(&state.pool).await;
    let token = admin_token(&state).await;

    let pedido_id = checkout_order(&state, &producto_id).await;

    let (status, body) = send(
        app(&state),
        get_with_token("/api/admin/pedidos?estado=PENDIENTE&search=ana", &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["stats"]["cantidad"], 1);
    assert_eq!(body["pedidos"][0]["id"], pedido_id.as_str());
    assert_eq!(body["pedidos"][0]["items"][0]["cantidad"], 1);

    // Unknown status value in the filter is rejected
    let (status, _) = send(
        app(&state),
        get_with_token("/api/admin/pedidos?estado=ENVIADOO", &token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, detail) = send(
        app(&state),
        get_with_token(&format!("/api/admin/pedidos/{pedido_id}"), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["estadoPedido"], "PENDIENTE");
    assert_eq!(detail["estadoPago"], "PENDIENTE");
    assert_eq!(detail["envio"], 10000);
}

#[tokio::test]
async fn test_order_mutator_transitions_and_side_effects() {
    let state = test_state().await;
    let (_, producto_id, _) = seed_catalog(&state.pool).await;
    let token = admin_token(&state).await;
    let pedido_id = checkout_order(&state, &producto_id).await;

    // Unknown enum value → 400
    let (status, _) = send(
        app(&state),
        put_json_with_token(
            &format!("/api/admin/pedidos/{pedido_id}"),
            &json!({ "estadoPedido": "ENVIADOO" }),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Forward transition with tracking data; shipping mail is best-effort
    let (status, body) = send(
        app(&state),
        put_json_with_token(
            &format!("/api/admin/pedidos/{pedido_id}"),
            &json!({ "estadoPedido": "ENVIADO", "trackingNumber": "TRK-001" }),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "update failed: {body}");
    assert_eq!(body["estadoPedido"], "ENVIADO");
    assert_eq!(body["trackingNumber"], "TRK-001");

    // Backward transition is rejected
    let (status, body) = send(
        app(&state),
        put_json_with_token(
            &format!("/api/admin/pedidos/{pedido_id}"),
            &json!({ "estadoPedido": "PROCESANDO" }),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Transición"));

    // Cancellation after shipment is rejected
    let (status, _) = send(
        app(&state),
        put_json_with_token(
            &format!("/api/admin/pedidos/{pedido_id}"),
            &json!({ "estadoPedido": "CANCELADO" }),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Delivery records the metric and completes the lifecycle
    let (status, body) = send(
        app(&state),
        put_json_with_token(
            &format!("/api/admin/pedidos/{pedido_id}"),
            &json!({ "estadoPedido": "ENTREGADO" }),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estadoPedido"], "ENTREGADO");

    // Refund only applies to a settled payment
    let (status, _) = send(
        app(&state),
        put_json_with_token(
            &format!("/api/admin/pedidos/{pedido_id}"),
            &json!({ "estadoPago": "REEMBOLSADO" }),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_statistics_endpoint() {
    let state = test_state().await;
    let (_, producto_id, _) = seed_catalog(&state.pool).await;
    let token = admin_token(&state).await;

    let pedido_id = checkout_order(&state, &producto_id).await;

    // Settle and deliver the order so it shows up in every aggregate
    let event = json!({
        "type": "checkout.session.completed",
        "data": { "object": {
            "payment_intent": "pi_test_1",
            "metadata": { "pedido_id": pedido_id }
        } }
    });
    send(
        app(&state),
        signed_webhook("/api/webhooks/stripe", &event, WEBHOOK_SECRET),
    )
    .await;
    send(
        app(&state),
        put_json_with_token(
            &format!("/api/admin/pedidos/{pedido_id}"),
            &json!({ "estadoPedido": "ENTREGADO" }),
            &token,
        ),
    )
    .await;

    let (status, body) = send(
        app(&state),
        get_with_token("/api/admin/estadisticas?periodo=mes", &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "stats failed: {body}");
    assert_eq!(body["totalVentas"], 35990); // 25990 + 10000 envío
    assert_eq!(body["totalPedidos"], 1);
    assert_eq!(body["pedidosPendientes"], 0);
    assert_eq!(body["totalProductos"], 1);
    assert_eq!(body["productosBajoStock"], 1); // stock 4 < 10 after the sale
    assert_eq!(body["ventasMensuales"][0]["cantidad"], 1);
    assert_eq!(body["productosMasVendidos"][0]["unidadesVendidas"], 1);
    assert_eq!(body["categoriasMasVendidas"][0]["nombre"], "Camisetas");
    assert_eq!(body["mejoresClientes"][0]["clienteEmail"], "ana@example.com");
    assert_eq!(body["periodo"]["actual"], "mes");
}
