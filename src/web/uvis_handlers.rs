// src/web/uvis_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        solicitacao::{NovaSolicitacaoForm, Status},
        usuario::UsuarioSessao,
    },
    services::solicitacao_service,
    state::AppState,
    templates::{PaginaCadastro, PaginaDashboard},
};
use askama::Template;
use axum::{
    extract::{Extension, Form, Query, State},
    response::{Html, IntoResponse, Redirect},
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ParamsDashboard {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub msg: Option<String>,
    pub erro: Option<String>,
}

fn opcoes_de_status() -> Vec<&'static str> {
    Status::TODOS.iter().map(|s| s.as_str()).collect()
}

// GET / — painel da unidade; perfis de gestão vão para /admin
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(sessao): Extension<UsuarioSessao>,
    Query(params): Query<ParamsDashboard>,
) -> AppResult<impl IntoResponse> {
    if sessao.papel.e_gestao() {
        return Ok(Redirect::to("/admin").into_response());
    }

    let pagina = solicitacao_service::listar_do_usuario(
        &state.db_pool,
        sessao.id,
        params.status.as_deref(),
        params.page.unwrap_or(1),
    )
    .await?;

    let template = PaginaDashboard {
        nome: sessao.nome,
        solicitacoes: pagina.itens,
        pagina: pagina.pagina,
        total_paginas: pagina.total_paginas,
        filtro_status: params.status.unwrap_or_default(),
        status_opcoes: opcoes_de_status(),
        mensagem: params.msg,
        erro: params.erro,
    };
    Ok(Html(template.render()?).into_response())
}

// GET /novo_cadastro
pub async fn exibir_cadastro(
    Extension(sessao): Extension<UsuarioSessao>,
) -> AppResult<impl IntoResponse> {
    if sessao.papel.e_gestao() {
        return Ok(Redirect::to("/admin").into_response());
    }
    let template = PaginaCadastro {
        erro: None,
        valores: NovaSolicitacaoForm::default(),
    };
    Ok(Html(template.render()?).into_response())
}

// POST /novo_cadastro
pub async fn processar_cadastro(
    State(state): State<AppState>,
    Extension(sessao): Extension<UsuarioSessao>,
    Form(form): Form<NovaSolicitacaoForm>,
) -> AppResult<impl IntoResponse> {
    if sessao.papel.e_gestao() {
        return Ok(Redirect::to("/admin").into_response());
    }

    match solicitacao_service::criar(&state.db_pool, sessao.id, &form).await {
        Ok(_) => {
            let aviso = urlencoding::encode("Pedido enviado para análise!");
            Ok(Redirect::to(&format!("/?msg={aviso}")).into_response())
        }
        Err(AppError::Validacao(mensagem)) => {
            // Reapresenta o formulário preenchido com o erro específico
            let template = PaginaCadastro {
                erro: Some(mensagem),
                valores: form,
            };
            Ok(Html(template.render()?).into_response())
        }
        Err(e) => Err(e),
    }
}
