// src/services/relatorio_service.rs
//
// Relatórios são somente leitura e derivados inteiramente das tabelas
// solicitacoes/usuarios, sem cache: duas chamadas com os mesmos filtros e
// sem escritas no meio devolvem as mesmas contagens.
use crate::{
    error::AppResult,
    models::solicitacao::{SolicitacaoComAutor, Status},
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// Um ponto da série mensal: chave "AAAA-MM" + total de solicitações.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PontoMensal {
    pub mes: String,
    pub total: i64,
}

/// Uma linha de agrupamento (região, foco, unidade...), ordenada por total.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContagemGrupo {
    pub chave: String,
    pub total: i64,
}

/// Agregado de um mês-alvo, opcionalmente restrito a uma UVIS.
#[derive(Debug, Clone)]
pub struct AgregadoMensal {
    pub ano: i32,
    pub mes: u32,
    pub uvis_id: Option<i64>,

    pub total: i64,
    pub aprovadas: i64,
    pub negadas: i64,
    pub em_analise: i64,
    pub pendentes: i64,

    pub por_regiao: Vec<ContagemGrupo>,
    pub por_status: Vec<ContagemGrupo>,
    pub por_foco: Vec<ContagemGrupo>,
    pub por_tipo_visita: Vec<ContagemGrupo>,
    pub por_altura_voo: Vec<ContagemGrupo>,
    pub por_unidade: Vec<ContagemGrupo>,
}

impl AgregadoMensal {
    /// Rótulo do período no formato usado nos nomes de ficheiro.
    pub fn periodo(&self) -> String {
        format!("{}_{:02}", self.ano, self.mes)
    }

    pub fn contagem_status(&self, status: Status) -> i64 {
        match status {
            Status::Aprovado => self.aprovadas,
            Status::Negado => self.negadas,
            Status::EmAnalise => self.em_analise,
            Status::Pendente => self.pendentes,
        }
    }
}

/// Série (mês, total) ordenada por mês; a lista de anos selecionáveis na UI
/// é derivada da parte "AAAA" de cada chave.
pub async fn serie_mensal(pool: &SqlitePool) -> AppResult<Vec<PontoMensal>> {
    let serie = sqlx::query_as::<_, PontoMensal>(
        r#"
        SELECT strftime('%Y-%m', data_criacao) AS mes, COUNT(*) AS total
        FROM solicitacoes
        GROUP BY mes
        ORDER BY mes ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(serie)
}

pub fn anos_da_serie(serie: &[PontoMensal]) -> Vec<String> {
    let mut anos: Vec<String> = serie
        .iter()
        .filter_map(|p| p.mes.split('-').next().map(str::to_string))
        .collect();
    anos.dedup();
    anos
}

fn filtro_mes(consulta: &mut QueryBuilder<Sqlite>, ano: i32, mes: u32, uvis_id: Option<i64>) {
    consulta
        .push(" AND strftime('%Y', s.data_criacao) = ")
        .push_bind(ano.to_string())
        .push(" AND strftime('%m', s.data_criacao) = ")
        .push_bind(format!("{:02}", mes));
    if let Some(uvis) = uvis_id {
        consulta.push(" AND s.usuario_id = ").push_bind(uvis);
    }
}

async fn contar_status(
    pool: &SqlitePool,
    ano: i32,
    mes: u32,
    uvis_id: Option<i64>,
    status: Option<Status>,
) -> AppResult<i64> {
    let mut consulta: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM solicitacoes s WHERE 1=1");
    filtro_mes(&mut consulta, ano, mes, uvis_id);
    if let Some(status) = status {
        consulta.push(" AND s.status = ").push_bind(status.as_str());
    }
    let total: i64 = consulta.build_query_scalar().fetch_one(pool).await?;
    Ok(total)
}

/// Agrupamento por uma coluna da própria solicitação.
/// `coluna` vem sempre de literais internos, nunca de entrada do usuário.
async fn agrupar_por_coluna(
    pool: &SqlitePool,
    coluna: &str,
    ano: i32,
    mes: u32,
    uvis_id: Option<i64>,
) -> AppResult<Vec<ContagemGrupo>> {
    let mut consulta: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT s.{coluna} AS chave, COUNT(*) AS total FROM solicitacoes s WHERE s.{coluna} <> ''"
    ));
    filtro_mes(&mut consulta, ano, mes, uvis_id);
    consulta.push(" GROUP BY chave ORDER BY total DESC, chave ASC");

    let grupos = consulta
        .build_query_as::<ContagemGrupo>()
        .fetch_all(pool)
        .await?;
    Ok(grupos)
}

/// Agrupamento por uma coluna do usuário autor (região / nome da unidade).
async fn agrupar_por_autor(
    pool: &SqlitePool,
    coluna: &str,
    apenas_uvis: bool,
    ano: i32,
    mes: u32,
    uvis_id: Option<i64>,
) -> AppResult<Vec<ContagemGrupo>> {
    let mut consulta: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT u.{coluna} AS chave, COUNT(*) AS total \
         FROM solicitacoes s JOIN usuarios u ON u.id = s.usuario_id WHERE 1=1"
    ));
    if apenas_uvis {
        consulta.push(" AND u.tipo_usuario = 'uvis'");
    }
    filtro_mes(&mut consulta, ano, mes, uvis_id);
    consulta.push(" GROUP BY chave ORDER BY total DESC, chave ASC");

    let grupos = consulta
        .build_query_as::<ContagemGrupo>()
        .fetch_all(pool)
        .await?;
    Ok(grupos)
}

/// Calcula o agregado completo de um mês-alvo.
pub async fn agregado_do_mes(
    pool: &SqlitePool,
    ano: i32,
    mes: u32,
    uvis_id: Option<i64>,
) -> AppResult<AgregadoMensal> {
    tracing::debug!("Agregando relatório de {:02}/{} (uvis: {:?})", mes, ano, uvis_id);

    let total = contar_status(pool, ano, mes, uvis_id, None).await?;
    let aprovadas = contar_status(pool, ano, mes, uvis_id, Some(Status::Aprovado)).await?;
    let negadas = contar_status(pool, ano, mes, uvis_id, Some(Status::Negado)).await?;
    let em_analise = contar_status(pool, ano, mes, uvis_id, Some(Status::EmAnalise)).await?;
    let pendentes = contar_status(pool, ano, mes, uvis_id, Some(Status::Pendente)).await?;

    Ok(AgregadoMensal {
        ano,
        mes,
        uvis_id,
        total,
        aprovadas,
        negadas,
        em_analise,
        pendentes,
        por_regiao: agrupar_por_autor(pool, "regiao", false, ano, mes, uvis_id).await?,
        por_status: agrupar_por_coluna(pool, "status", ano, mes, uvis_id).await?,
        por_foco: agrupar_por_coluna(pool, "foco", ano, mes, uvis_id).await?,
        por_tipo_visita: agrupar_por_coluna(pool, "tipo_visita", ano, mes, uvis_id).await?,
        por_altura_voo: agrupar_por_coluna(pool, "altura_voo", ano, mes, uvis_id).await?,
        por_unidade: agrupar_por_autor(pool, "nome_uvis", true, ano, mes, uvis_id).await?,
    })
}

/// Registos individuais do mês-alvo (tabela de detalhe das exportações).
pub async fn detalhes_do_mes(
    pool: &SqlitePool,
    ano: i32,
    mes: u32,
    uvis_id: Option<i64>,
) -> AppResult<Vec<SolicitacaoComAutor>> {
    let mut consulta: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT s.*, u.nome_uvis, u.regiao \
         FROM solicitacoes s JOIN usuarios u ON u.id = s.usuario_id WHERE 1=1",
    );
    filtro_mes(&mut consulta, ano, mes, uvis_id);
    consulta.push(" ORDER BY s.data_criacao DESC, s.id DESC");

    let detalhes = consulta
        .build_query_as::<SolicitacaoComAutor>()
        .fetch_all(pool)
        .await?;
    Ok(detalhes)
}
