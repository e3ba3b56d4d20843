//! Account administration service tests.

mod common;

use axum::http::StatusCode;
use mockall::predicate::eq;

use brewmaster::config::ROLE_CAJERO;
use brewmaster::domain::auditoria::acciones;
use brewmaster::domain::{CambiosUsuario, Password, Rol};
use brewmaster::errors::AppError;
use brewmaster::infra::repositories::{
    MockAuditoriaRepository, MockRolRepository, MockUsuarioRepository,
};
use brewmaster::services::{DatosUsuario, UsuarioManager, UsuarioService};

use common::{admin, cajero, test_config, usuario, TestUnitOfWork};

fn roles() -> MockRolRepository {
    let mut roles = MockRolRepository::new();
    roles.expect_find_by_id().returning(|id| {
        Ok((id <= 3).then(|| Rol {
            id,
            nombre: ROLE_CAJERO.to_string(),
            descripcion: None,
        }))
    });
    roles
}

fn datos() -> DatosUsuario {
    DatosUsuario {
        rut: "12.345.678-5".to_string(),
        nombre: " Camila Rojas ".to_string(),
        email: "Camila@BrewMaster.cl".to_string(),
        password: "secreto123".to_string(),
        rol_id: 2,
    }
}

fn manager(uow: TestUnitOfWork) -> UsuarioManager<TestUnitOfWork> {
    UsuarioManager::new(uow.into_arc(), test_config())
}

#[tokio::test]
async fn test_create_normalises_and_audits() {
    let mut usuarios = MockUsuarioRepository::new();
    usuarios
        .expect_create()
        .withf(|nuevo| {
            nuevo.rut.as_str() == "12345678-5"
                && nuevo.nombre == "Camila Rojas"
                && nuevo.email == "camila@brewmaster.cl"
                && Password::from_hash(nuevo.password_hash.clone()).verify("secreto123")
        })
        .times(1)
        .returning(|nuevo| Ok(usuario(9, ROLE_CAJERO, &nuevo.password_hash)));

    let mut auditoria = MockAuditoriaRepository::new();
    auditoria
        .expect_registrar()
        .withf(|a| a.usuario_id == Some(1) && a.accion == acciones::CREAR && a.entidad_id == Some(9))
        .times(1)
        .returning(|_| Ok(()));

    let uow = TestUnitOfWork::new()
        .with_usuarios(usuarios)
        .with_roles(roles())
        .with_auditoria(auditoria);
    let creado = manager(uow).create(&admin(1), datos()).await.unwrap();

    assert_eq!(creado.id, 9);
}

#[tokio::test]
async fn test_duplicate_rut_is_a_bad_request() {
    let mut usuarios = MockUsuarioRepository::new();
    usuarios
        .expect_create()
        .returning(|_| Err(AppError::duplicate("Ya existe un usuario con ese RUT o email")));
    let mut auditoria = MockAuditoriaRepository::new();
    auditoria.expect_registrar().never();

    let uow = TestUnitOfWork::new()
        .with_usuarios(usuarios)
        .with_roles(roles())
        .with_auditoria(auditoria);
    let err = manager(uow).create(&admin(1), datos()).await.unwrap_err();

    assert!(matches!(err, AppError::Duplicate(_)));
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_rut_is_rejected_before_insert() {
    let mut usuarios = MockUsuarioRepository::new();
    usuarios.expect_create().never();

    let datos = DatosUsuario {
        rut: "12.345.678-9".to_string(),
        ..datos()
    };
    let err = manager(TestUnitOfWork::new().with_usuarios(usuarios))
        .create(&admin(1), datos)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_unknown_role_is_rejected() {
    let datos = DatosUsuario { rol_id: 99, ..datos() };
    let err = manager(TestUnitOfWork::new().with_roles(roles()))
        .create(&admin(1), datos)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_admin_cannot_deactivate_self() {
    let mut usuarios = MockUsuarioRepository::new();
    usuarios.expect_set_activo().never();

    let err = manager(TestUnitOfWork::new().with_usuarios(usuarios))
        .set_activo(&admin(1), 1, false)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_deactivate_other_account_is_audited() {
    let mut usuarios = MockUsuarioRepository::new();
    usuarios
        .expect_set_activo()
        .with(eq(7), eq(false))
        .times(1)
        .returning(|id, activo| {
            let mut u = usuario(id, ROLE_CAJERO, "hash");
            u.activo = activo;
            Ok(u)
        });

    let mut auditoria = MockAuditoriaRepository::new();
    auditoria
        .expect_registrar()
        .withf(|a| a.accion == acciones::DESACTIVAR && a.entidad_id == Some(7))
        .times(1)
        .returning(|_| Ok(()));

    let uow = TestUnitOfWork::new()
        .with_usuarios(usuarios)
        .with_auditoria(auditoria);
    let usuario = manager(uow).set_activo(&admin(1), 7, false).await.unwrap();

    assert!(!usuario.activo);
}

#[tokio::test]
async fn test_cashier_cannot_read_other_accounts() {
    let err = manager(TestUnitOfWork::new())
        .get(&cajero(7), 8)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn test_empty_update_is_rejected() {
    let err = manager(TestUnitOfWork::new())
        .update(&admin(1), 7, CambiosUsuario::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_short_password_is_rejected() {
    let mut usuarios = MockUsuarioRepository::new();
    usuarios
        .expect_find_by_id()
        .returning(|id| Ok(Some(usuario(id, ROLE_CAJERO, "hash"))));
    usuarios.expect_set_password().never();

    let err = manager(TestUnitOfWork::new().with_usuarios(usuarios))
        .cambiar_password(&cajero(7), 7, "123".to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}
