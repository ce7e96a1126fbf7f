// src/services/excel_service.rs
use crate::{
    error::{AppError, AppResult},
    models::solicitacao::{SolicitacaoComAutor, Status},
    services::relatorio_service::{AgregadoMensal, ContagemGrupo},
};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

const COR_CABECALHO: Color = Color::RGB(0x1F4E78);
const COR_ZEBRA: Color = Color::RGB(0xF2F2F2);

fn erro(e: rust_xlsxwriter::XlsxError) -> AppError {
    AppError::Exportacao(format!("xlsx: {e}"))
}

fn formato_cabecalho() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(COR_CABECALHO)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
}

fn formato_celula(zebra: bool) -> Format {
    let formato = Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();
    if zebra {
        formato.set_background_color(COR_ZEBRA)
    } else {
        formato
    }
}

const CABECALHOS_LISTAGEM: &[&str] = &[
    "ID",
    "Unidade (UVIS)",
    "Região",
    "CEP",
    "Endereço Completo",
    "UF",
    "Foco da Ação",
    "Tipo de Visita",
    "Altura de Voo",
    "Data Agendamento",
    "Hora Agendamento",
    "Status",
    "Protocolo DECEA",
    "Latitude",
    "Longitude",
    "Justificativa",
];

fn escrever_linhas(
    folha: &mut Worksheet,
    linhas: &[SolicitacaoComAutor],
    primeira_linha: u32,
) -> AppResult<u32> {
    let mut linha_atual = primeira_linha;
    for (indice, item) in linhas.iter().enumerate() {
        let s = &item.solicitacao;
        let formato = formato_celula(indice % 2 == 1);
        let valores: Vec<String> = vec![
            s.id.to_string(),
            item.nome_uvis.clone(),
            item.regiao.clone(),
            s.cep.clone(),
            s.endereco_completo(),
            s.uf.clone(),
            s.foco.clone(),
            s.tipo_visita.clone(),
            s.altura_voo.clone(),
            s.data_agendamento.clone(),
            s.hora_agendamento.clone(),
            s.status.clone(),
            s.protocolo_texto().to_string(),
            s.latitude_texto().to_string(),
            s.longitude_texto().to_string(),
            s.justificativa_texto().to_string(),
        ];
        for (coluna, valor) in valores.iter().enumerate() {
            folha
                .write_string_with_format(linha_atual, coluna as u16, valor, &formato)
                .map_err(erro)?;
        }
        linha_atual += 1;
    }
    Ok(linha_atual)
}

/// Exportação da listagem de gestão (mesmos filtros da tela), no formato da
/// planilha original: cabeçalho estilizado, bordas, painel congelado,
/// autofiltro e colunas com largura automática.
pub fn exportar_listagem(linhas: &[SolicitacaoComAutor]) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let folha = workbook.add_worksheet();
    folha.set_name("Relatório de Solicitações").map_err(erro)?;

    let cabecalho = formato_cabecalho();
    for (coluna, titulo) in CABECALHOS_LISTAGEM.iter().enumerate() {
        folha
            .write_string_with_format(0, coluna as u16, *titulo, &cabecalho)
            .map_err(erro)?;
    }

    let ultima_linha = escrever_linhas(folha, linhas, 1)?;

    folha.set_freeze_panes(1, 0).map_err(erro)?;
    folha
        .autofilter(
            0,
            0,
            ultima_linha.saturating_sub(1),
            (CABECALHOS_LISTAGEM.len() - 1) as u16,
        )
        .map_err(erro)?;
    folha.autofit();

    workbook.save_to_buffer().map_err(erro)
}

fn escrever_bloco_grupo(
    folha: &mut Worksheet,
    titulo: &str,
    grupos: &[ContagemGrupo],
    linha_inicial: u32,
) -> AppResult<u32> {
    let cabecalho = formato_cabecalho();
    folha
        .write_string_with_format(linha_inicial, 0, titulo, &cabecalho)
        .map_err(erro)?;
    folha
        .write_string_with_format(linha_inicial, 1, "Total", &cabecalho)
        .map_err(erro)?;

    let mut linha = linha_inicial + 1;
    for (indice, grupo) in grupos.iter().enumerate() {
        let formato = formato_celula(indice % 2 == 1);
        folha
            .write_string_with_format(linha, 0, &grupo.chave, &formato)
            .map_err(erro)?;
        folha
            .write_number_with_format(linha, 1, grupo.total as f64, &formato)
            .map_err(erro)?;
        linha += 1;
    }
    // linha em branco entre blocos
    Ok(linha + 1)
}

/// Relatório mensal agregado: folha de resumo com os agrupamentos e folha de
/// detalhe com os registos individuais do período.
pub fn exportar_relatorio(
    agregado: &AgregadoMensal,
    detalhes: &[SolicitacaoComAutor],
) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();

    let resumo = workbook.add_worksheet();
    resumo.set_name("Resumo").map_err(erro)?;

    let totais = [
        ("Total de solicitações", agregado.total),
        ("Aprovadas", agregado.contagem_status(Status::Aprovado)),
        ("Negadas", agregado.contagem_status(Status::Negado)),
        ("Em análise", agregado.contagem_status(Status::EmAnalise)),
        ("Pendentes", agregado.contagem_status(Status::Pendente)),
    ];
    let mut linha = escrever_bloco_grupo(
        resumo,
        &format!("Resumo {:02}/{}", agregado.mes, agregado.ano),
        &totais
            .iter()
            .map(|(chave, total)| ContagemGrupo {
                chave: chave.to_string(),
                total: *total,
            })
            .collect::<Vec<_>>(),
        0,
    )?;

    let blocos: [(&str, &[ContagemGrupo]); 6] = [
        ("Por região", &agregado.por_regiao),
        ("Por status", &agregado.por_status),
        ("Por foco", &agregado.por_foco),
        ("Por tipo de visita", &agregado.por_tipo_visita),
        ("Por altura de voo", &agregado.por_altura_voo),
        ("Por unidade (UVIS)", &agregado.por_unidade),
    ];
    for (titulo, grupos) in blocos {
        linha = escrever_bloco_grupo(resumo, titulo, grupos, linha)?;
    }
    resumo.autofit();

    let detalhe = workbook.add_worksheet();
    detalhe.set_name("Detalhes").map_err(erro)?;
    let cabecalho = formato_cabecalho();
    for (coluna, titulo) in CABECALHOS_LISTAGEM.iter().enumerate() {
        detalhe
            .write_string_with_format(0, coluna as u16, *titulo, &cabecalho)
            .map_err(erro)?;
    }
    let ultima_linha = escrever_linhas(detalhe, detalhes, 1)?;
    detalhe.set_freeze_panes(1, 0).map_err(erro)?;
    detalhe
        .autofilter(
            0,
            0,
            ultima_linha.saturating_sub(1),
            (CABECALHOS_LISTAGEM.len() - 1) as u16,
        )
        .map_err(erro)?;
    detalhe.autofit();

    workbook.save_to_buffer().map_err(erro)
}

/// Nome do ficheiro de relatório, codificando o período e a UVIS filtrada.
pub fn nome_ficheiro_relatorio(agregado: &AgregadoMensal, extensao: &str) -> String {
    match agregado.uvis_id {
        Some(uvis) => format!("relatorio_{}_uvis{}.{}", agregado.periodo(), uvis, extensao),
        None => format!("relatorio_{}.{}", agregado.periodo(), extensao),
    }
}
