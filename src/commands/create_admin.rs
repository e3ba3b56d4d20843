//! Create-admin command - Bootstraps the first administrator account.

use crate::cli::args::CreateAdminArgs;
use crate::config::{Config, ROLE_ADMIN};
use crate::domain::{NuevoUsuario, Password, Rut};
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, RolRepository, RolStore, UsuarioRepository, UsuarioStore};

/// Execute the create-admin command
pub async fn execute(args: CreateAdminArgs, config: Config) -> AppResult<()> {
    let rut = Rut::parse(&args.rut)?;
    let nombre = args.nombre.trim().to_string();
    if nombre.is_empty() {
        return Err(AppError::validation("El nombre es obligatorio"));
    }
    let password_hash = Password::new(&args.password, config.bcrypt_cost)?.into_string();

    let db = Database::connect(&config).await?;
    let rol = RolStore::new(db.get_connection())
        .find_by_nombre(ROLE_ADMIN)
        .await?
        .ok_or_else(|| AppError::internal("ADMIN role missing, run `brewmaster migrate up` first"))?;

    let usuario = UsuarioStore::new(db.get_connection())
        .create(NuevoUsuario {
            rut,
            nombre,
            email: args.email.trim().to_lowercase(),
            password_hash,
            rol_id: rol.id,
        })
        .await?;

    tracing::info!("Administrator {} created with id {}", usuario.rut, usuario.id);
    println!("Administrador {} creado (id {})", usuario.rut, usuario.id);
    Ok(())
}
