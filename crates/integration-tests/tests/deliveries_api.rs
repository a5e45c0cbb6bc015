//! Delivery endpoints through the router, backed by the in-memory store.

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use deliveries_api::db::Store;
use deliveries_integration_tests::{send, test_app};

const PESO_MESSAGE: &str = "O campo 'peso' é obrigatório e deve ser maior que zero";

fn create_body(peso: Value, cidade: &str, nome: &str, cpf: &str) -> String {
    json!({
        "delivery": {
            "peso": peso,
            "endereco": "Av. Boa Viagem, 1000",
            "logradouro": "Av. Boa Viagem",
            "numero": "1000",
            "bairro": "Boa Viagem",
            "cidade": cidade,
            "estado": "PE",
            "pais": "Brasil",
            "latitude": -8.12,
            "longitude": -34.9
        },
        "cliente": { "nome": nome, "cpf": cpf, "email": "c@example.com", "telefone": "" }
    })
    .to_string()
}

fn valid_body() -> String {
    create_body(json!(4.5), "Recife", "Maria", "123.456.789-09")
}

#[tokio::test]
async fn test_create_delivery_with_new_cpf() {
    let (app, store) = test_app();

    let resp = send(&app, Method::POST, "/deliveries", Some(&valid_body())).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.body,
        json!({ "success": true, "id": 1, "message": "Entrega cadastrada com sucesso!" })
    );

    let clients = store.list_clients().await.expect("list clients");
    let deliveries = store.list_deliveries().await.expect("list deliveries");
    assert_eq!(clients.len(), 1);
    assert_eq!(deliveries.len(), 1);
    let client = clients.first().expect("client");
    let delivery = deliveries.first().expect("delivery");
    assert_eq!(delivery.id.as_i32(), 1);
    assert_eq!(delivery.client_id, client.id);
    assert_eq!(client.cpf.as_str(), "12345678909");
}

#[tokio::test]
async fn test_create_delivery_reuses_client_by_cpf() {
    let (app, store) = test_app();

    send(&app, Method::POST, "/deliveries", Some(&valid_body())).await;
    let second = create_body(json!(1), "Olinda", "Nome Diferente", "12345678909");
    let resp = send(&app, Method::POST, "/deliveries", Some(&second)).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["id"], 2);

    let clients = store.list_clients().await.expect("list clients");
    assert_eq!(clients.len(), 1);
    assert_eq!(clients.first().map(|c| c.name.as_str()), Some("Maria"));

    let resp = send(&app, Method::GET, "/deliveries", None).await;
    let owners: Vec<&Value> = resp
        .body
        .as_array()
        .expect("array")
        .iter()
        .map(|d| &d["cliente_id"])
        .collect();
    assert_eq!(owners, vec![&json!(1), &json!(1)]);
}

#[tokio::test]
async fn test_create_delivery_peso_always_reported() {
    let (app, _) = test_app();

    for peso in [json!(0), json!(-2.5), Value::Null] {
        let body = create_body(peso, "", "", "123.456.789-09");
        let resp = send(&app, Method::POST, "/deliveries", Some(&body)).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.body, json!({ "error": PESO_MESSAGE }));
    }
}

#[tokio::test]
async fn test_create_delivery_validation_order() {
    let (app, store) = test_app();

    let cases = [
        (create_body(json!(0), "", "", "111.111.111-11"), "CPF inválido"),
        (create_body(json!(1), "", "Maria", "123"), "CPF inválido"),
        (create_body(json!(1), "", "", "123.456.789-09"), "O campo 'cidade' é obrigatório"),
        (
            create_body(json!(1), "Recife", "", "123.456.789-09"),
            "O campo 'nome' do cliente é obrigatório",
        ),
    ];

    for (body, message) in cases {
        let resp = send(&app, Method::POST, "/deliveries", Some(&body)).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.body["error"], message);
    }

    let no_address = json!({
        "delivery": { "peso": 1, "cidade": "Recife" },
        "cliente": { "nome": "Maria", "cpf": "12345678909" }
    })
    .to_string();
    let resp = send(&app, Method::POST, "/deliveries", Some(&no_address)).await;
    assert_eq!(resp.body["error"], "O campo 'endereco' é obrigatório");

    assert!(store.list_clients().await.expect("list").is_empty());
}

#[tokio::test]
async fn test_create_delivery_accepts_null_optional_fields() {
    let (app, store) = test_app();

    let body = json!({
        "delivery": {
            "peso": 3,
            "endereco": "Rua da Aurora, 10",
            "complemento": null,
            "bairro": null,
            "cidade": "Recife",
            "latitude": null
        },
        "cliente": { "nome": "Joana", "cpf": "529.982.247-25", "email": null, "telefone": null }
    })
    .to_string();
    let resp = send(&app, Method::POST, "/deliveries", Some(&body)).await;

    assert_eq!(resp.status, StatusCode::OK);
    let delivery = store
        .list_deliveries()
        .await
        .expect("list")
        .into_iter()
        .next()
        .expect("delivery");
    assert_eq!(delivery.details.complement, "");
    assert_eq!(delivery.details.latitude, None);

    let resp = send(&app, Method::GET, "/clients", None).await;
    assert_eq!(resp.body[0]["email"], "");
}

#[tokio::test]
async fn test_create_delivery_bad_json() {
    let (app, _) = test_app();

    let resp = send(
        &app,
        Method::POST,
        "/deliveries",
        Some(r#"{"delivery": {"peso": "pesado"}}"#),
    )
    .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body, json!({ "error": "Erro ao decodificar o JSON" }));
}

#[tokio::test]
async fn test_get_delivery() {
    let (app, _) = test_app();
    send(&app, Method::POST, "/deliveries", Some(&valid_body())).await;

    let resp = send(&app, Method::GET, "/deliveries/id/1", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["peso"], 4.5);
    assert_eq!(resp.body["bairro"], "Boa Viagem");
    assert_eq!(resp.body["complemento"], "");
    assert_eq!(resp.body["cliente_id"], 1);
}

#[tokio::test]
async fn test_get_missing_delivery_is_404() {
    let (app, _) = test_app();

    let resp = send(&app, Method::GET, "/deliveries/id/77", None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body, json!({ "error": "Entrega não encontrada" }));

    let resp = send(&app, Method::GET, "/deliveries/id/sete", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body, json!({ "error": "ID inválido" }));
}

#[tokio::test]
async fn test_list_by_city() {
    let (app, _) = test_app();
    send(&app, Method::POST, "/deliveries", Some(&valid_body())).await;
    let olinda = create_body(json!(1), "Olinda", "Maria", "123.456.789-09");
    send(&app, Method::POST, "/deliveries", Some(&olinda)).await;

    let resp = send(&app, Method::GET, "/deliveries/city?cidade=Olinda", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body.as_array().map(Vec::len), Some(1));
    assert_eq!(resp.body[0]["cidade"], "Olinda");

    let resp = send(&app, Method::GET, "/deliveries/city?cidade=Natal", None).await;
    assert_eq!(resp.body, json!([]));
}

#[tokio::test]
async fn test_list_by_city_requires_param() {
    let (app, _) = test_app();

    for uri in ["/deliveries/city", "/deliveries/city?cidade="] {
        let resp = send(&app, Method::GET, uri, None).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.body, json!({ "error": "O parâmetro 'cidade' é obrigatório" }));
    }
}

#[tokio::test]
async fn test_update_delivery() {
    let (app, _) = test_app();
    send(&app, Method::POST, "/deliveries", Some(&valid_body())).await;

    let update = json!({
        "cliente_id": 1,
        "peso": 7.25,
        "endereco": "Rua Nova, 5",
        "cidade": "Jaboatão"
    })
    .to_string();
    let resp = send(&app, Method::PUT, "/deliveries/1", Some(&update)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, json!({ "message": "Entrega atualizada com sucesso!" }));

    let resp = send(&app, Method::GET, "/deliveries/id/1", None).await;
    assert_eq!(resp.body["cidade"], "Jaboatão");
    assert_eq!(resp.body["peso"], 7.25);
    assert_eq!(resp.body["latitude"], Value::Null);
}

#[tokio::test]
async fn test_update_delivery_errors() {
    let (app, _) = test_app();
    send(&app, Method::POST, "/deliveries", Some(&valid_body())).await;

    let valid = json!({ "cliente_id": 1, "peso": 1, "endereco": "Rua", "cidade": "Recife" });

    let resp = send(&app, Method::PUT, "/deliveries/abc", Some(&valid.to_string())).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"], "ID inválido");

    let resp = send(&app, Method::PUT, "/deliveries/1", Some("not json")).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"], "Erro ao decodificar o JSON");

    let no_weight = json!({ "cliente_id": 1, "endereco": "Rua", "cidade": "Recife" });
    let resp = send(&app, Method::PUT, "/deliveries/1", Some(&no_weight.to_string())).await;
    assert_eq!(resp.body["error"], PESO_MESSAGE);

    let no_owner = json!({ "peso": 1, "endereco": "Rua", "cidade": "Recife" });
    let resp = send(&app, Method::PUT, "/deliveries/1", Some(&no_owner.to_string())).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"], "O campo 'cliente_id' é obrigatório");

    let resp = send(&app, Method::PUT, "/deliveries/99", Some(&valid.to_string())).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let stranger = json!({ "cliente_id": 99, "peso": 1, "endereco": "Rua", "cidade": "Recife" });
    let resp = send(&app, Method::PUT, "/deliveries/1", Some(&stranger.to_string())).await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_delivery_keeps_client() {
    let (app, store) = test_app();
    send(&app, Method::POST, "/deliveries", Some(&valid_body())).await;

    for _ in 0..2 {
        let resp = send(&app, Method::DELETE, "/deliveries/1", None).await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body, json!({ "message": "Entrega excluída com sucesso!" }));
    }

    let resp = send(&app, Method::GET, "/deliveries/id/1", None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(store.list_clients().await.expect("list").len(), 1);
}

#[tokio::test]
async fn test_health_endpoints() {
    let (app, _) = test_app();

    let resp = send(&app, Method::GET, "/health", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, Value::String("ok".to_string()));

    let resp = send(&app, Method::GET, "/health/ready", None).await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let (app, _) = test_app();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .expect("request");

    let response = app.oneshot(request).await.expect("response");

    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-123")
    );
}
