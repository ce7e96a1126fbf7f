// src/services/solicitacao_service.rs
use crate::{
    error::{AppError, AppResult},
    models::solicitacao::{
        AtualizacaoForm, EdicaoCompletaForm, FiltrosAdmin, NovaSolicitacaoForm, Pagina,
        Solicitacao, SolicitacaoComAutor, Status,
    },
};
use chrono::{NaiveDate, NaiveTime};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub const ITENS_POR_PAGINA_UVIS: i64 = 10;
pub const ITENS_POR_PAGINA_ADMIN: i64 = 9;

const SELECT_COM_AUTOR: &str = "SELECT s.*, u.nome_uvis, u.regiao \
     FROM solicitacoes s JOIN usuarios u ON u.id = s.usuario_id WHERE 1=1";

/// Valida e canoniza data (AAAA-MM-DD) e hora (HH:MM) de agendamento.
/// O par canônico devolvido faz ida e volta com o formato de exibição.
pub fn validar_data_hora(data: &str, hora: &str) -> AppResult<(String, String)> {
    let data = NaiveDate::parse_from_str(data.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::Validacao("Data de agendamento inválida. Use o formato AAAA-MM-DD.".to_string())
    })?;
    let hora = NaiveTime::parse_from_str(hora.trim(), "%H:%M").map_err(|_| {
        AppError::Validacao("Hora de agendamento inválida. Use o formato HH:MM.".to_string())
    })?;
    Ok((
        data.format("%Y-%m-%d").to_string(),
        hora.format("%H:%M").to_string(),
    ))
}

fn validar_status(status: &str) -> AppResult<&'static str> {
    Status::parse(status.trim())
        .map(|s| s.as_str())
        .ok_or_else(|| AppError::Validacao(format!("Status desconhecido: '{}'", status)))
}

fn vazio_para_nulo(valor: String) -> Option<String> {
    let valor = valor.trim().to_string();
    if valor.is_empty() {
        None
    } else {
        Some(valor)
    }
}

/// Cria uma solicitação para a unidade logada; status inicial PENDENTE.
pub async fn criar(
    pool: &SqlitePool,
    usuario_id: i64,
    form: &NovaSolicitacaoForm,
) -> AppResult<i64> {
    let (data, hora) = validar_data_hora(&form.data, &form.hora)?;

    let mut tx = pool.begin().await?;
    let resultado = sqlx::query(
        r#"
        INSERT INTO solicitacoes
            (data_agendamento, hora_agendamento,
             cep, logradouro, numero, bairro, cidade, uf, complemento,
             foco, tipo_visita, altura_voo, criadouro, apoio_cet, observacoes,
             status, usuario_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
        "#,
    )
    .bind(&data)
    .bind(&hora)
    .bind(form.cep.trim())
    .bind(form.logradouro.trim())
    .bind(form.numero.trim())
    .bind(form.bairro.trim())
    .bind(form.cidade.trim())
    .bind(form.uf.trim().to_uppercase())
    .bind(form.complemento.trim())
    .bind(form.foco.trim())
    .bind(form.tipo_visita.trim())
    .bind(form.altura_voo.trim())
    .bind(form.criadouro.trim())
    .bind(form.apoio_cet.trim())
    .bind(form.observacoes.trim())
    .bind(Status::Pendente.as_str())
    .bind(usuario_id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    let id = resultado.last_insert_rowid();
    tracing::info!("✅ Solicitação {} criada para usuário {}", id, usuario_id);
    Ok(id)
}

pub async fn buscar_por_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Solicitacao>> {
    let solicitacao =
        sqlx::query_as::<_, Solicitacao>("SELECT * FROM solicitacoes WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(solicitacao)
}

pub async fn buscar_com_autor(
    pool: &SqlitePool,
    id: i64,
) -> AppResult<Option<SolicitacaoComAutor>> {
    let sql = format!("{SELECT_COM_AUTOR} AND s.id = ?1");
    let linha = sqlx::query_as::<_, SolicitacaoComAutor>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(linha)
}

/// Listagem da unidade: apenas os próprios pedidos, mais recentes primeiro.
pub async fn listar_do_usuario(
    pool: &SqlitePool,
    usuario_id: i64,
    status: Option<&str>,
    pagina: i64,
) -> AppResult<Pagina<Solicitacao>> {
    let pagina = pagina.max(1);
    let status = status.filter(|s| !s.is_empty());

    let mut contagem: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM solicitacoes WHERE usuario_id = ");
    contagem.push_bind(usuario_id);
    if let Some(status) = status {
        contagem.push(" AND status = ").push_bind(status.to_string());
    }
    let total_itens: i64 = contagem.build_query_scalar().fetch_one(pool).await?;

    let mut consulta: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT * FROM solicitacoes WHERE usuario_id = ");
    consulta.push_bind(usuario_id);
    if let Some(status) = status {
        consulta.push(" AND status = ").push_bind(status.to_string());
    }
    consulta
        .push(" ORDER BY data_criacao DESC, id DESC LIMIT ")
        .push_bind(ITENS_POR_PAGINA_UVIS)
        .push(" OFFSET ")
        .push_bind((pagina - 1).saturating_mul(ITENS_POR_PAGINA_UVIS));

    let itens = consulta
        .build_query_as::<Solicitacao>()
        .fetch_all(pool)
        .await?;

    Ok(Pagina {
        itens,
        pagina,
        total_itens,
        total_paginas: (total_itens + ITENS_POR_PAGINA_UVIS - 1) / ITENS_POR_PAGINA_UVIS,
    })
}

fn aplicar_filtros_admin(consulta: &mut QueryBuilder<Sqlite>, filtros: &FiltrosAdmin) {
    if let Some(status) = filtros.status.as_deref().filter(|s| !s.is_empty()) {
        consulta.push(" AND s.status = ").push_bind(status.to_string());
    }
    if let Some(unidade) = filtros.unidade.as_deref().filter(|s| !s.is_empty()) {
        consulta
            .push(" AND LOWER(u.nome_uvis) LIKE '%' || LOWER(")
            .push_bind(unidade.to_string())
            .push(") || '%'");
    }
    if let Some(regiao) = filtros.regiao.as_deref().filter(|s| !s.is_empty()) {
        consulta
            .push(" AND LOWER(u.regiao) LIKE '%' || LOWER(")
            .push_bind(regiao.to_string())
            .push(") || '%'");
    }
}

/// Listagem de gestão: todas as unidades, com filtros e paginação.
pub async fn listar_admin(
    pool: &SqlitePool,
    filtros: &FiltrosAdmin,
) -> AppResult<Pagina<SolicitacaoComAutor>> {
    let pagina = filtros.page.unwrap_or(1).max(1);

    let mut contagem: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT COUNT(*) FROM solicitacoes s JOIN usuarios u ON u.id = s.usuario_id WHERE 1=1",
    );
    aplicar_filtros_admin(&mut contagem, filtros);
    let total_itens: i64 = contagem.build_query_scalar().fetch_one(pool).await?;

    let mut consulta: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_COM_AUTOR);
    aplicar_filtros_admin(&mut consulta, filtros);
    consulta
        .push(" ORDER BY s.data_criacao DESC, s.id DESC LIMIT ")
        .push_bind(ITENS_POR_PAGINA_ADMIN)
        .push(" OFFSET ")
        .push_bind((pagina - 1).saturating_mul(ITENS_POR_PAGINA_ADMIN));

    let itens = consulta
        .build_query_as::<SolicitacaoComAutor>()
        .fetch_all(pool)
        .await?;

    Ok(Pagina {
        itens,
        pagina,
        total_itens,
        total_paginas: (total_itens + ITENS_POR_PAGINA_ADMIN - 1) / ITENS_POR_PAGINA_ADMIN,
    })
}

/// Mesma consulta da listagem, sem paginação. Alimenta a exportação Excel.
pub async fn listar_admin_completo(
    pool: &SqlitePool,
    filtros: &FiltrosAdmin,
) -> AppResult<Vec<SolicitacaoComAutor>> {
    let mut consulta: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_COM_AUTOR);
    aplicar_filtros_admin(&mut consulta, filtros);
    consulta.push(" ORDER BY s.data_criacao DESC, s.id DESC");

    let itens = consulta
        .build_query_as::<SolicitacaoComAutor>()
        .fetch_all(pool)
        .await?;
    Ok(itens)
}

/// Atualização rápida da gestão: status, protocolo, justificativa e
/// coordenadas. Dois editores simultâneos seguem last-write-wins.
pub async fn atualizar(pool: &SqlitePool, id: i64, form: &AtualizacaoForm) -> AppResult<()> {
    let status = validar_status(&form.status)?;

    let mut tx = pool.begin().await?;
    let linhas = sqlx::query(
        r#"
        UPDATE solicitacoes
        SET status = ?1, protocolo = ?2, justificativa = ?3,
            latitude = ?4, longitude = ?5
        WHERE id = ?6
        "#,
    )
    .bind(status)
    .bind(vazio_para_nulo(form.protocolo.clone()))
    .bind(vazio_para_nulo(form.justificativa.clone()))
    .bind(vazio_para_nulo(form.latitude.clone()))
    .bind(vazio_para_nulo(form.longitude.clone()))
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if linhas == 0 {
        tx.rollback().await?;
        tracing::warn!("Atualização falhou: solicitação {} não encontrada", id);
        return Err(AppError::NaoEncontrado);
    }
    tx.commit().await?;

    tracing::info!("✅ Solicitação {} atualizada (status: {})", id, status);
    Ok(())
}

/// Edição completa (somente admin): sobrescreve todos os campos do registo.
pub async fn editar_completo(
    pool: &SqlitePool,
    id: i64,
    form: &EdicaoCompletaForm,
) -> AppResult<()> {
    let (data, hora) = validar_data_hora(&form.data, &form.hora)?;
    let status = validar_status(&form.status)?;

    let mut tx = pool.begin().await?;
    let linhas = sqlx::query(
        r#"
        UPDATE solicitacoes
        SET data_agendamento = ?1, hora_agendamento = ?2,
            cep = ?3, logradouro = ?4, numero = ?5, bairro = ?6,
            cidade = ?7, uf = ?8, complemento = ?9,
            foco = ?10, tipo_visita = ?11, altura_voo = ?12,
            criadouro = ?13, apoio_cet = ?14, observacoes = ?15,
            status = ?16, protocolo = ?17, justificativa = ?18,
            latitude = ?19, longitude = ?20
        WHERE id = ?21
        "#,
    )
    .bind(&data)
    .bind(&hora)
    .bind(form.cep.trim())
    .bind(form.logradouro.trim())
    .bind(form.numero.trim())
    .bind(form.bairro.trim())
    .bind(form.cidade.trim())
    .bind(form.uf.trim().to_uppercase())
    .bind(form.complemento.trim())
    .bind(form.foco.trim())
    .bind(form.tipo_visita.trim())
    .bind(form.altura_voo.trim())
    .bind(form.criadouro.trim())
    .bind(form.apoio_cet.trim())
    .bind(form.observacoes.trim())
    .bind(status)
    .bind(vazio_para_nulo(form.protocolo.clone()))
    .bind(vazio_para_nulo(form.justificativa.clone()))
    .bind(vazio_para_nulo(form.latitude.clone()))
    .bind(vazio_para_nulo(form.longitude.clone()))
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if linhas == 0 {
        tx.rollback().await?;
        tracing::warn!("Edição completa falhou: solicitação {} não encontrada", id);
        return Err(AppError::NaoEncontrado);
    }
    tx.commit().await?;

    tracing::info!("✅ Solicitação {} editada por completo", id);
    Ok(())
}

/// Remove uma solicitação (somente admin) e devolve o nome da unidade dona,
/// para a mensagem de confirmação. Erros de remoção sobem para o chamador.
pub async fn deletar(pool: &SqlitePool, id: i64) -> AppResult<String> {
    // Carrega o autor junto: depois do DELETE não haveria como consultá-lo.
    let linha = buscar_com_autor(pool, id).await?.ok_or(AppError::NaoEncontrado)?;

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM solicitacoes WHERE id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(
        "🗑️ Solicitação {} da unidade '{}' removida",
        id,
        linha.nome_uvis
    );
    Ok(linha.nome_uvis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::services::usuario_service;

    async fn pool_semeado() -> SqlitePool {
        let pool = db::pool_em_memoria().await;
        db::semear_usuarios(&pool).await.unwrap();
        pool
    }

    fn form_valido() -> NovaSolicitacaoForm {
        NovaSolicitacaoForm {
            data: "2026-01-01".to_string(),
            hora: "10:00".to_string(),
            cep: "05077-000".to_string(),
            logradouro: "Rua Fortunato Ferraz".to_string(),
            numero: "100".to_string(),
            bairro: "Vila Anastácio".to_string(),
            cidade: "São Paulo".to_string(),
            uf: "sp".to_string(),
            foco: "Aedes".to_string(),
            tipo_visita: "Vistoria".to_string(),
            altura_voo: "30m".to_string(),
            criadouro: "SIM".to_string(),
            apoio_cet: "NAO".to_string(),
            ..Default::default()
        }
    }

    async fn id_de(pool: &SqlitePool, login: &str) -> i64 {
        usuario_service::buscar_por_login(pool, login)
            .await
            .unwrap()
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn criar_faz_ida_e_volta_de_data_e_hora() {
        let pool = pool_semeado().await;
        let lapa = id_de(&pool, "lapa").await;

        let id = criar(&pool, lapa, &form_valido()).await.unwrap();
        let registo = buscar_por_id(&pool, id).await.unwrap().unwrap();

        assert_eq!(registo.data_agendamento, "2026-01-01");
        assert_eq!(registo.hora_agendamento, "10:00");
        assert_eq!(registo.status, "PENDENTE");
        assert_eq!(registo.uf, "SP");
        assert_eq!(registo.usuario_id, lapa);
    }

    #[tokio::test]
    async fn criar_rejeita_data_ou_hora_invalida_sem_persistir_nada() {
        let pool = pool_semeado().await;
        let lapa = id_de(&pool, "lapa").await;

        let mut form = form_valido();
        form.data = "01/01/2026".to_string();
        assert!(matches!(
            criar(&pool, lapa, &form).await.unwrap_err(),
            AppError::Validacao(_)
        ));

        let mut form = form_valido();
        form.hora = "10h30".to_string();
        assert!(matches!(
            criar(&pool, lapa, &form).await.unwrap_err(),
            AppError::Validacao(_)
        ));

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM solicitacoes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn listagem_da_unidade_nunca_vaza_pedidos_de_outra() {
        let pool = pool_semeado().await;
        let lapa = id_de(&pool, "lapa").await;
        let teste = id_de(&pool, "teste").await;

        for _ in 0..3 {
            criar(&pool, lapa, &form_valido()).await.unwrap();
        }
        for _ in 0..2 {
            criar(&pool, teste, &form_valido()).await.unwrap();
        }

        let pagina_lapa = listar_do_usuario(&pool, lapa, None, 1).await.unwrap();
        assert_eq!(pagina_lapa.total_itens, 3);
        assert!(pagina_lapa.itens.iter().all(|s| s.usuario_id == lapa));

        let pagina_teste = listar_do_usuario(&pool, teste, None, 1).await.unwrap();
        assert_eq!(pagina_teste.total_itens, 2);
    }

    #[tokio::test]
    async fn pagina_fora_do_intervalo_volta_vazia_sem_erro() {
        let pool = pool_semeado().await;
        let lapa = id_de(&pool, "lapa").await;
        criar(&pool, lapa, &form_valido()).await.unwrap();

        let pagina = listar_do_usuario(&pool, lapa, None, 99).await.unwrap();
        assert!(pagina.itens.is_empty());
        assert_eq!(pagina.total_itens, 1);

        let filtros = FiltrosAdmin {
            page: Some(99),
            ..Default::default()
        };
        let pagina_admin = listar_admin(&pool, &filtros).await.unwrap();
        assert!(pagina_admin.itens.is_empty());
    }

    #[tokio::test]
    async fn pagina_gigante_vinda_da_query_string_volta_vazia() {
        let pool = pool_semeado().await;
        let lapa = id_de(&pool, "lapa").await;
        criar(&pool, lapa, &form_valido()).await.unwrap();

        let pagina = listar_do_usuario(&pool, lapa, None, i64::MAX).await.unwrap();
        assert!(pagina.itens.is_empty());
        assert_eq!(pagina.total_itens, 1);

        let filtros = FiltrosAdmin {
            page: Some(i64::MAX),
            ..Default::default()
        };
        let pagina_admin = listar_admin(&pool, &filtros).await.unwrap();
        assert!(pagina_admin.itens.is_empty());
        assert_eq!(pagina_admin.total_itens, 1);
    }

    #[tokio::test]
    async fn filtros_da_gestao_por_status_unidade_e_regiao() {
        let pool = pool_semeado().await;
        let lapa = id_de(&pool, "lapa").await;
        let teste = id_de(&pool, "teste").await;

        let id_lapa = criar(&pool, lapa, &form_valido()).await.unwrap();
        criar(&pool, teste, &form_valido()).await.unwrap();

        atualizar(
            &pool,
            id_lapa,
            &AtualizacaoForm {
                status: "APROVADO".to_string(),
                protocolo: "DEC-001".to_string(),
                justificativa: String::new(),
                latitude: "-23.52".to_string(),
                longitude: "-46.72".to_string(),
            },
        )
        .await
        .unwrap();

        let filtros = FiltrosAdmin {
            status: Some("APROVADO".to_string()),
            ..Default::default()
        };
        let aprovadas = listar_admin(&pool, &filtros).await.unwrap();
        assert_eq!(aprovadas.total_itens, 1);
        assert_eq!(aprovadas.itens[0].solicitacao.id, id_lapa);
        assert_eq!(aprovadas.itens[0].solicitacao.protocolo_texto(), "DEC-001");

        // Substring case-insensitive no nome da unidade e na região
        let filtros = FiltrosAdmin {
            unidade: Some("lapa".to_string()),
            ..Default::default()
        };
        assert_eq!(listar_admin(&pool, &filtros).await.unwrap().total_itens, 1);

        let filtros = FiltrosAdmin {
            regiao: Some("oes".to_string()),
            ..Default::default()
        };
        assert_eq!(listar_admin(&pool, &filtros).await.unwrap().total_itens, 1);
    }

    #[tokio::test]
    async fn atualizar_rejeita_status_fora_do_conjunto() {
        let pool = pool_semeado().await;
        let lapa = id_de(&pool, "lapa").await;
        let id = criar(&pool, lapa, &form_valido()).await.unwrap();

        let form = AtualizacaoForm {
            status: "CANCELADO".to_string(),
            protocolo: String::new(),
            justificativa: String::new(),
            latitude: String::new(),
            longitude: String::new(),
        };
        assert!(matches!(
            atualizar(&pool, id, &form).await.unwrap_err(),
            AppError::Validacao(_)
        ));

        let registo = buscar_por_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(registo.status, "PENDENTE");
    }

    #[tokio::test]
    async fn atualizar_id_inexistente_devolve_nao_encontrado() {
        let pool = pool_semeado().await;
        let form = AtualizacaoForm {
            status: "APROVADO".to_string(),
            protocolo: String::new(),
            justificativa: String::new(),
            latitude: String::new(),
            longitude: String::new(),
        };
        assert!(matches!(
            atualizar(&pool, 9999, &form).await.unwrap_err(),
            AppError::NaoEncontrado
        ));
    }

    #[tokio::test]
    async fn deletar_remove_e_segunda_tentativa_e_nao_encontrado() {
        let pool = pool_semeado().await;
        let lapa = id_de(&pool, "lapa").await;
        let id = criar(&pool, lapa, &form_valido()).await.unwrap();

        let nome = deletar(&pool, id).await.unwrap();
        assert_eq!(nome, "UVIS Lapa/Pinheiros");

        let listagem = listar_admin(&pool, &FiltrosAdmin::default()).await.unwrap();
        assert!(listagem.itens.iter().all(|s| s.solicitacao.id != id));

        assert!(matches!(
            deletar(&pool, id).await.unwrap_err(),
            AppError::NaoEncontrado
        ));
    }

    #[tokio::test]
    async fn edicao_completa_sobrescreve_todos_os_campos() {
        let pool = pool_semeado().await;
        let lapa = id_de(&pool, "lapa").await;
        let id = criar(&pool, lapa, &form_valido()).await.unwrap();

        let form = EdicaoCompletaForm {
            data: "2026-02-10".to_string(),
            hora: "14:30".to_string(),
            cep: "01000-000".to_string(),
            logradouro: "Av. Paulista".to_string(),
            numero: "1578".to_string(),
            bairro: "Bela Vista".to_string(),
            cidade: "São Paulo".to_string(),
            uf: "SP".to_string(),
            complemento: "Térreo".to_string(),
            foco: "Escorpião".to_string(),
            tipo_visita: "Nebulização".to_string(),
            altura_voo: "45m".to_string(),
            criadouro: "NAO".to_string(),
            apoio_cet: "SIM".to_string(),
            observacoes: "Reagendado".to_string(),
            status: "EM ANÁLISE".to_string(),
            protocolo: "DEC-010".to_string(),
            justificativa: String::new(),
            latitude: String::new(),
            longitude: String::new(),
        };
        editar_completo(&pool, id, &form).await.unwrap();

        let registo = buscar_por_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(registo.data_agendamento, "2026-02-10");
        assert_eq!(registo.hora_agendamento, "14:30");
        assert_eq!(registo.foco, "Escorpião");
        assert_eq!(registo.status, "EM ANÁLISE");
        assert_eq!(registo.protocolo_texto(), "DEC-010");
        assert_eq!(registo.justificativa, None);
    }
}
