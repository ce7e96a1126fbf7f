// src/web/agenda_handlers.rs
use crate::{
    error::AppResult,
    models::usuario::UsuarioSessao,
    services::agenda_service,
    state::AppState,
    templates::PaginaAgenda,
};
use askama::Template;
use axum::{
    extract::{Extension, State},
    response::{Html, IntoResponse},
};

// GET /agenda — calendário com o feed JSON embutido na própria página
pub async fn pagina(
    State(state): State<AppState>,
    Extension(sessao): Extension<UsuarioSessao>,
) -> AppResult<impl IntoResponse> {
    let eventos = agenda_service::eventos(&state.db_pool, &sessao).await?;
    let eventos_json = serde_json::to_string(&eventos).unwrap_or_else(|_| "[]".to_string());

    let template = PaginaAgenda {
        nome: sessao.nome,
        eventos_json,
    };
    Ok(Html(template.render()?))
}
