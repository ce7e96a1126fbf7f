// src/web/relatorio_handlers.rs
use crate::{
    error::AppResult,
    services::{excel_service, pdf_service, relatorio_service, usuario_service},
    state::AppState,
    templates::PaginaRelatorios,
};
use askama::Template;
use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse},
};
use chrono::{Datelike, Utc};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ParamsRelatorio {
    pub mes: Option<u32>,
    pub ano: Option<i32>,
    pub uvis_id: Option<i64>,
}

impl ParamsRelatorio {
    /// Período alvo; sem parâmetros vale o mês corrente.
    fn periodo(&self) -> (i32, u32) {
        let hoje = Utc::now().date_naive();
        (
            self.ano.unwrap_or_else(|| hoje.year()),
            self.mes.filter(|m| (1..=12).contains(m)).unwrap_or_else(|| hoje.month()),
        )
    }
}

// GET /relatorios?mes=&ano=&uvis_id=
pub async fn pagina(
    State(state): State<AppState>,
    Query(params): Query<ParamsRelatorio>,
) -> AppResult<impl IntoResponse> {
    let (ano, mes) = params.periodo();

    let agregado =
        relatorio_service::agregado_do_mes(&state.db_pool, ano, mes, params.uvis_id).await?;
    let serie = relatorio_service::serie_mensal(&state.db_pool).await?;
    let anos = relatorio_service::anos_da_serie(&serie);
    let unidades = usuario_service::listar_uvis(&state.db_pool).await?;

    // Séries para os gráficos do lado do cliente
    let serie_json = serde_json::to_string(
        &serie
            .iter()
            .map(|p| (p.mes.as_str(), p.total))
            .collect::<Vec<_>>(),
    )
    .unwrap_or_else(|_| "[]".to_string());
    let status_json = serde_json::to_string(&[
        ("APROVADO", agregado.aprovadas),
        ("NEGADO", agregado.negadas),
        ("EM ANÁLISE", agregado.em_analise),
        ("PENDENTE", agregado.pendentes),
    ])
    .unwrap_or_else(|_| "[]".to_string());

    let template = PaginaRelatorios {
        agregado,
        anos,
        unidades,
        serie_json,
        status_json,
    };
    Ok(Html(template.render()?))
}

// GET /admin/exportar_relatorio_excel
pub async fn exportar_excel(
    State(state): State<AppState>,
    Query(params): Query<ParamsRelatorio>,
) -> AppResult<impl IntoResponse> {
    let (ano, mes) = params.periodo();
    let agregado =
        relatorio_service::agregado_do_mes(&state.db_pool, ano, mes, params.uvis_id).await?;
    let detalhes =
        relatorio_service::detalhes_do_mes(&state.db_pool, ano, mes, params.uvis_id).await?;

    let bytes = excel_service::exportar_relatorio(&agregado, &detalhes)?;
    let nome = excel_service::nome_ficheiro_relatorio(&agregado, "xlsx");
    tracing::info!("📊 Exportação Excel do relatório: {}", nome);

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{nome}\""),
            ),
        ],
        bytes,
    ))
}

// GET /admin/exportar_relatorio_pdf
pub async fn exportar_pdf(
    State(state): State<AppState>,
    Query(params): Query<ParamsRelatorio>,
) -> AppResult<impl IntoResponse> {
    let (ano, mes) = params.periodo();
    let agregado =
        relatorio_service::agregado_do_mes(&state.db_pool, ano, mes, params.uvis_id).await?;
    let detalhes =
        relatorio_service::detalhes_do_mes(&state.db_pool, ano, mes, params.uvis_id).await?;

    // Geração síncrona e potencialmente pesada: fora do executor async
    let dir_fontes = state.config.dir_fontes.clone();
    let bytes = tokio::task::spawn_blocking(move || {
        pdf_service::gerar_relatorio(&agregado, &detalhes, &dir_fontes)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (gerar_relatorio): {:?}", e);
        crate::error::AppError::Interno
    })??;

    let nome = format!("relatorio_{}_{:02}", ano, mes);
    let nome = match params.uvis_id {
        Some(uvis) => format!("{nome}_uvis{uvis}.pdf"),
        None => format!("{nome}.pdf"),
    };
    tracing::info!("📕 Exportação PDF do relatório: {}", nome);

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{nome}\""),
            ),
        ],
        bytes,
    ))
}
