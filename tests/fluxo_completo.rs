// tests/fluxo_completo.rs
//
// Fluxo ponta a ponta contra o router completo (sessões incluídas), com base
// SQLite em memória: UVIS cadastra, gestão analisa, relatório reflete.
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sgsv::{config::Config, db, state::AppState, web};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::{str::FromStr, sync::Arc};
use tower::ServiceExt;
use tower_cookies::CookieManagerLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::SqliteStore;

async fn preparar_app() -> (Router, SqlitePool) {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("opções sqlite")
        .create_if_missing(true);

    // Uma única conexão: cada conexão :memory: teria a sua própria base.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("pool em memória");

    db::MIGRATOR.run(&pool).await.expect("migrações");
    db::semear_usuarios(&pool).await.expect("semente de usuários");

    let session_store = SqliteStore::new(pool.clone())
        .with_table_name("sessions")
        .expect("session store");
    session_store.migrate().await.expect("migração de sessões");
    let session_layer = SessionManagerLayer::new(session_store).with_secure(false);

    let app_state = AppState {
        db_pool: pool.clone(),
        config: Arc::new(Config {
            database_url: "sqlite::memory:".to_string(),
            session_secret: "segredo-de-teste".to_string(),
            debug: false,
            porta: 0,
            dir_fontes: "./fonts".to_string(),
        }),
    };

    let app = web::routes::criar_router(app_state).layer(
        tower::ServiceBuilder::new()
            .layer(CookieManagerLayer::new())
            .layer(session_layer),
    );
    (app, pool)
}

fn requisicao_get(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("requisição GET")
}

fn requisicao_post(uri: &str, cookie: &str, corpo: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(corpo.to_string()))
        .expect("requisição POST")
}

async fn corpo_texto(resposta: axum::response::Response) -> String {
    let bytes = resposta
        .into_body()
        .collect()
        .await
        .expect("corpo da resposta")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("corpo utf-8")
}

/// Faz login e devolve o cookie de sessão ("id=...").
async fn login(app: &Router, usuario: &str, senha: &str) -> String {
    let resposta = app
        .clone()
        .oneshot(requisicao_post(
            "/login",
            "",
            &format!("login={usuario}&senha={senha}"),
        ))
        .await
        .expect("POST /login");
    assert_eq!(resposta.status(), StatusCode::SEE_OTHER, "login de {usuario}");

    let set_cookie = resposta
        .headers()
        .get(header::SET_COOKIE)
        .expect("cookie de sessão")
        .to_str()
        .expect("cookie ascii");
    set_cookie
        .split(';')
        .next()
        .expect("par nome=valor")
        .to_string()
}

const FORM_NOVO: &str = "data=2026-03-10&hora=09%3A30&cep=05001-000&logradouro=Av.+Francisco+Matarazzo&numero=100&bairro=%C3%81gua+Branca&cidade=S%C3%A3o+Paulo&uf=sp&complemento=&foco=Aedes&tipo_visita=Nebuliza%C3%A7%C3%A3o&altura_voo=30m&criadouro=SIM&apoio_cet=NAO&observacoes=";

#[tokio::test]
async fn fluxo_uvis_ate_relatorio() {
    let (app, pool) = preparar_app().await;

    // UVIS cadastra uma solicitação
    let cookie_uvis = login(&app, "lapa", "1234").await;
    let resposta = app
        .clone()
        .oneshot(requisicao_post("/novo_cadastro", &cookie_uvis, FORM_NOVO))
        .await
        .expect("POST /novo_cadastro");
    assert_eq!(resposta.status(), StatusCode::SEE_OTHER);

    // O dashboard da UVIS mostra o pedido como PENDENTE
    let resposta = app
        .clone()
        .oneshot(requisicao_get("/", &cookie_uvis))
        .await
        .expect("GET /");
    assert_eq!(resposta.status(), StatusCode::OK);
    let corpo = corpo_texto(resposta).await;
    assert!(corpo.contains("PENDENTE"), "dashboard sem o status novo");
    assert!(corpo.contains("Aedes"));

    let (id, uf): (i64, String) =
        sqlx::query_as("SELECT id, uf FROM solicitacoes ORDER BY id DESC LIMIT 1")
            .fetch_one(&pool)
            .await
            .expect("solicitação gravada");
    assert_eq!(uf, "SP", "UF deve ser normalizada para maiúsculas");

    // Gestão vê a mesma solicitação na listagem
    let cookie_admin = login(&app, "admin", "admin123").await;
    let resposta = app
        .clone()
        .oneshot(requisicao_get("/admin", &cookie_admin))
        .await
        .expect("GET /admin");
    assert_eq!(resposta.status(), StatusCode::OK);
    let corpo = corpo_texto(resposta).await;
    assert!(corpo.contains("UVIS Lapa/Pinheiros"));
    assert!(corpo.contains("PENDENTE"));

    // Admin aprova com protocolo
    let resposta = app
        .clone()
        .oneshot(requisicao_post(
            &format!("/admin/atualizar/{id}"),
            &cookie_admin,
            "status=APROVADO&protocolo=DEC-001&justificativa=&latitude=-23.52&longitude=-46.67",
        ))
        .await
        .expect("POST /admin/atualizar");
    assert_eq!(resposta.status(), StatusCode::SEE_OTHER);

    let (status, protocolo): (String, Option<String>) =
        sqlx::query_as("SELECT status, protocolo FROM solicitacoes WHERE id = ?1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .expect("solicitação atualizada");
    assert_eq!(status, "APROVADO");
    assert_eq!(protocolo.as_deref(), Some("DEC-001"));

    // A listagem passa a mostrar o protocolo
    let resposta = app
        .clone()
        .oneshot(requisicao_get("/admin", &cookie_admin))
        .await
        .expect("GET /admin");
    let corpo = corpo_texto(resposta).await;
    assert!(corpo.contains("DEC-001"));

    // O relatório do mês do registo conta 1 aprovada
    let mes_criacao: String =
        sqlx::query_scalar("SELECT strftime('%Y-%m', data_criacao) FROM solicitacoes WHERE id = ?1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .expect("mês de criação");
    let (ano, mes) = mes_criacao.split_once('-').expect("chave AAAA-MM");
    let resposta = app
        .clone()
        .oneshot(requisicao_get(
            &format!("/relatorios?ano={ano}&mes={}", mes.trim_start_matches('0')),
            &cookie_admin,
        ))
        .await
        .expect("GET /relatorios");
    assert_eq!(resposta.status(), StatusCode::OK);
    let corpo = corpo_texto(resposta).await;
    assert!(corpo.contains("Relatório mensal"));
    assert!(corpo.contains("UVIS Lapa/Pinheiros"));
}

#[tokio::test]
async fn sem_sessao_redireciona_para_login() {
    let (app, _pool) = preparar_app().await;

    for uri in ["/", "/admin", "/relatorios", "/agenda"] {
        let resposta = app
            .clone()
            .oneshot(requisicao_get(uri, ""))
            .await
            .expect("GET sem sessão");
        assert_eq!(resposta.status(), StatusCode::SEE_OTHER, "{uri}");
        let destino = resposta.headers()[header::LOCATION].to_str().expect("location");
        assert_eq!(destino, "/login", "{uri}");
    }
}

#[tokio::test]
async fn login_invalido_volta_ao_formulario() {
    let (app, _pool) = preparar_app().await;

    let resposta = app
        .clone()
        .oneshot(requisicao_post("/login", "", "login=lapa&senha=errada"))
        .await
        .expect("POST /login");
    assert_eq!(resposta.status(), StatusCode::OK);
    let corpo = corpo_texto(resposta).await;
    assert!(corpo.contains("Login incorreto."));
}

#[tokio::test]
async fn papeis_limitam_o_acesso() {
    let (app, _pool) = preparar_app().await;

    // UVIS não entra na área de gestão
    let cookie_uvis = login(&app, "lapa", "1234").await;
    let resposta = app
        .clone()
        .oneshot(requisicao_get("/admin", &cookie_uvis))
        .await
        .expect("GET /admin como uvis");
    assert_eq!(resposta.status(), StatusCode::SEE_OTHER);
    let destino = resposta.headers()[header::LOCATION].to_str().expect("location");
    assert!(destino.starts_with("/?erro="), "destino: {destino}");

    // Visualizar lê a listagem mas não altera nada
    let cookie_vis = login(&app, "visualizar", "1234").await;
    let resposta = app
        .clone()
        .oneshot(requisicao_get("/admin", &cookie_vis))
        .await
        .expect("GET /admin como visualizar");
    assert_eq!(resposta.status(), StatusCode::OK);

    let resposta = app
        .clone()
        .oneshot(requisicao_post(
            "/admin/atualizar/1",
            &cookie_vis,
            "status=APROVADO",
        ))
        .await
        .expect("POST /admin/atualizar como visualizar");
    assert_eq!(resposta.status(), StatusCode::SEE_OTHER);
    let destino = resposta.headers()[header::LOCATION].to_str().expect("location");
    assert!(destino.starts_with("/admin?erro="), "destino: {destino}");

    // Operário edita, mas relatórios e exclusão são só do admin
    let cookie_op = login(&app, "operario", "operario123").await;
    let resposta = app
        .clone()
        .oneshot(requisicao_get("/relatorios", &cookie_op))
        .await
        .expect("GET /relatorios como operario");
    assert_eq!(resposta.status(), StatusCode::SEE_OTHER);

    let resposta = app
        .clone()
        .oneshot(requisicao_post("/admin/deletar/1", &cookie_op, ""))
        .await
        .expect("POST /admin/deletar como operario");
    assert_eq!(resposta.status(), StatusCode::SEE_OTHER);

    let resposta = app
        .clone()
        .oneshot(requisicao_get("/admin/exportar_excel", &cookie_op))
        .await
        .expect("GET /admin/exportar_excel como operario");
    assert_eq!(resposta.status(), StatusCode::OK);
    let tipo = resposta.headers()[header::CONTENT_TYPE].to_str().expect("content-type");
    assert!(tipo.contains("spreadsheetml"), "content-type: {tipo}");
}

#[tokio::test]
async fn cadastro_com_data_invalida_nao_persiste() {
    let (app, pool) = preparar_app().await;

    let cookie_uvis = login(&app, "teste", "1234").await;
    let corpo_form = FORM_NOVO.replace("data=2026-03-10", "data=10%2F03%2F2026");
    let resposta = app
        .clone()
        .oneshot(requisicao_post("/novo_cadastro", &cookie_uvis, &corpo_form))
        .await
        .expect("POST /novo_cadastro inválido");
    // Formulário reapresentado com a mensagem de validação
    assert_eq!(resposta.status(), StatusCode::OK);
    let corpo = corpo_texto(resposta).await;
    assert!(corpo.contains("alerta-erro"));
    assert!(corpo.contains("Aedes"), "valores digitados devem ser mantidos");

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM solicitacoes")
        .fetch_one(&pool)
        .await
        .expect("contagem");
    assert_eq!(total, 0);
}
