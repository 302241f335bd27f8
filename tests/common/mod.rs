use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A week of plausible sales activity inside the test window
/// (reference instant 18/06/2025 15:30:00, current week starts Sunday 15/06).
pub const SAMPLE_EXPORT: &str = "\
Data_Hora;Valor_Venda;Valor_Pago;Meio_de_Pagamento;Doc_Cliente;Maquinas;Usou_Cupom;Codigo_Cupom
15/06/2025 09:12:00;17,90;17,90;Pix;11122233344;Lavadora 1;Nao;N/D
15/06/2025 19:40:00;35,80;35,80;Cartao de Credito;55566677788;Lavadora 2, Secadora 1;Nao;N/D
16/06/2025 10:05:00;17,90;17,90;Pix;11122233344;Secadora 2;Nao;N/D
16/06/2025 18:30:00;50,00;50,00;Pix;99988877766;Recarga;Nao;N/D
17/06/2025 11:00:00;0,00;0,00;Saldo da Carteira;99988877766;Lavadora 1;Nao;N/D
17/06/2025 20:15:00;20,00;18,00;Pix;55566677788;Lavadora 1, Secadora 2;Sim;BEMVINDO10
18/06/2025 08:45:00;17,90;17,90;Pix;11122233344;Lavadora 3;Nao;N/D
";

pub fn reference_instant() -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2025, 6, 18)
        .unwrap()
        .and_hms_opt(15, 30, 0)
        .unwrap()
}

pub fn write_export(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

pub fn setup_sample_export() -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let path = write_export(temp_dir.path(), "sales.csv", SAMPLE_EXPORT)?;
    Ok((temp_dir, path))
}
