// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        admin_handlers, agenda_handlers, auth_handlers, mw_auth, mw_papel, relatorio_handlers,
        uvis_handlers,
    },
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn criar_router(app_state: AppState) -> Router {
    // --- Rotas públicas ---
    let rotas_publicas = Router::new()
        .route(
            "/login",
            get(auth_handlers::exibir_login).post(auth_handlers::processar_login),
        )
        .route("/logout", get(auth_handlers::processar_logout));

    // --- Gestão: mutações e exportação da listagem (admin + operario) ---
    let rotas_edicao = Router::new()
        .route("/atualizar/{id}", post(admin_handlers::atualizar))
        .route("/exportar_excel", get(admin_handlers::exportar_excel))
        .route_layer(middleware::from_fn(mw_papel::exigir_editor));

    // --- Gestão: exclusivas do admin ---
    let rotas_admin_total = Router::new()
        .route(
            "/editar_completo/{id}",
            get(admin_handlers::exibir_edicao_completa)
                .post(admin_handlers::processar_edicao_completa),
        )
        .route("/deletar/{id}", post(admin_handlers::deletar))
        .route(
            "/exportar_relatorio_excel",
            get(relatorio_handlers::exportar_excel),
        )
        .route(
            "/exportar_relatorio_pdf",
            get(relatorio_handlers::exportar_pdf),
        )
        .route_layer(middleware::from_fn(mw_papel::exigir_admin));

    // --- Painel de gestão (admin + operario + visualizar) ---
    let rotas_admin = Router::new()
        .route("/", get(admin_handlers::painel))
        .merge(rotas_edicao)
        .merge(rotas_admin_total)
        .route_layer(middleware::from_fn(mw_papel::exigir_gestao));

    // --- Relatórios agregados (somente admin) ---
    let rotas_relatorios = Router::new()
        .route("/relatorios", get(relatorio_handlers::pagina))
        .route_layer(middleware::from_fn(mw_papel::exigir_admin));

    // --- Rotas autenticadas ---
    let rotas_autenticadas = Router::new()
        .route("/", get(uvis_handlers::dashboard))
        .route(
            "/novo_cadastro",
            get(uvis_handlers::exibir_cadastro).post(uvis_handlers::processar_cadastro),
        )
        .route("/agenda", get(agenda_handlers::pagina))
        .nest("/admin", rotas_admin)
        .merge(rotas_relatorios)
        // Autenticação para TODAS as rotas acima (incluindo as aninhadas)
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::exigir_login,
        ));

    Router::new()
        .merge(rotas_publicas)
        .merge(rotas_autenticadas)
        .with_state(app_state)
}
