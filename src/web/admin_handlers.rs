// src/web/admin_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        solicitacao::{AtualizacaoForm, EdicaoCompletaForm, FiltrosAdmin, Status},
        usuario::{Papel, UsuarioSessao},
    },
    services::{excel_service, solicitacao_service},
    state::AppState,
    templates::{PaginaAdmin, PaginaEdicaoCompleta},
};
use askama::Template;
use axum::{
    extract::{Extension, Form, Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect},
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ParamsAdmin {
    pub status: Option<String>,
    pub unidade: Option<String>,
    pub regiao: Option<String>,
    pub page: Option<i64>,
    pub msg: Option<String>,
    pub erro: Option<String>,
}

impl ParamsAdmin {
    fn filtros(&self) -> FiltrosAdmin {
        FiltrosAdmin {
            status: self.status.clone(),
            unidade: self.unidade.clone(),
            regiao: self.regiao.clone(),
            page: self.page,
        }
    }
}

fn opcoes_de_status() -> Vec<&'static str> {
    Status::TODOS.iter().map(|s| s.as_str()).collect()
}

fn voltar_com_mensagem(mensagem: &str) -> Redirect {
    Redirect::to(&format!("/admin?msg={}", urlencoding::encode(mensagem)))
}

// GET /admin — listagem de gestão com filtros e paginação
pub async fn painel(
    State(state): State<AppState>,
    Extension(sessao): Extension<UsuarioSessao>,
    Query(params): Query<ParamsAdmin>,
) -> AppResult<impl IntoResponse> {
    let pagina = solicitacao_service::listar_admin(&state.db_pool, &params.filtros()).await?;

    let template = PaginaAdmin {
        pedidos: pagina.itens,
        pagina: pagina.pagina,
        total_paginas: pagina.total_paginas,
        total_itens: pagina.total_itens,
        filtro_status: params.status.unwrap_or_default(),
        filtro_unidade: params.unidade.unwrap_or_default(),
        filtro_regiao: params.regiao.unwrap_or_default(),
        status_opcoes: opcoes_de_status(),
        mensagem: params.msg,
        erro: params.erro,
        pode_editar: sessao.papel.pode_editar(),
        e_admin: sessao.papel == Papel::Admin,
    };
    Ok(Html(template.render()?))
}

// POST /admin/atualizar/{id} — atualização rápida (status/geo/protocolo)
pub async fn atualizar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<AtualizacaoForm>,
) -> AppResult<impl IntoResponse> {
    match solicitacao_service::atualizar(&state.db_pool, id, &form).await {
        Ok(()) => Ok(voltar_com_mensagem("Pedido atualizado com sucesso!").into_response()),
        Err(AppError::Validacao(mensagem)) => {
            let aviso = urlencoding::encode(&mensagem);
            Ok(Redirect::to(&format!("/admin?erro={aviso}")).into_response())
        }
        Err(e) => Err(e),
    }
}

// GET /admin/editar_completo/{id}
pub async fn exibir_edicao_completa(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let linha = solicitacao_service::buscar_com_autor(&state.db_pool, id)
        .await?
        .ok_or(AppError::NaoEncontrado)?;

    let template = PaginaEdicaoCompleta {
        s: linha.solicitacao,
        nome_uvis: linha.nome_uvis,
        status_opcoes: opcoes_de_status(),
        erro: None,
    };
    Ok(Html(template.render()?))
}

// POST /admin/editar_completo/{id}
pub async fn processar_edicao_completa(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<EdicaoCompletaForm>,
) -> AppResult<impl IntoResponse> {
    match solicitacao_service::editar_completo(&state.db_pool, id, &form).await {
        Ok(()) => Ok(voltar_com_mensagem("Solicitação editada com sucesso!").into_response()),
        Err(AppError::Validacao(mensagem)) => {
            // Reapresenta o formulário com o estado atual do registo
            let linha = solicitacao_service::buscar_com_autor(&state.db_pool, id)
                .await?
                .ok_or(AppError::NaoEncontrado)?;
            let template = PaginaEdicaoCompleta {
                s: linha.solicitacao,
                nome_uvis: linha.nome_uvis,
                status_opcoes: opcoes_de_status(),
                erro: Some(mensagem),
            };
            Ok(Html(template.render()?).into_response())
        }
        Err(e) => Err(e),
    }
}

// POST /admin/deletar/{id} — erros de remoção sobem para a página de erro,
// nunca são engolidos em silêncio.
pub async fn deletar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let nome_uvis = solicitacao_service::deletar(&state.db_pool, id).await?;
    Ok(voltar_com_mensagem(&format!(
        "Solicitação da unidade '{}' removida.",
        nome_uvis
    )))
}

// GET /admin/exportar_excel — snapshot da listagem com os filtros ativos
pub async fn exportar_excel(
    State(state): State<AppState>,
    Query(params): Query<ParamsAdmin>,
) -> AppResult<impl IntoResponse> {
    let linhas =
        solicitacao_service::listar_admin_completo(&state.db_pool, &params.filtros()).await?;
    let bytes = excel_service::exportar_listagem(&linhas)?;

    tracing::info!("📄 Exportação Excel da listagem: {} registos", linhas.len());
    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"relatorio_solicitacoes.xlsx\"".to_string(),
            ),
        ],
        bytes,
    ))
}
